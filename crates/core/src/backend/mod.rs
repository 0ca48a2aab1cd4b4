pub mod traits;

// Backend implementations
pub mod gotrue;
pub mod memory;
pub mod postgrest;
