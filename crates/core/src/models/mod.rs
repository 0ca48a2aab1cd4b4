pub mod category;
pub mod display;
pub mod goal;
pub mod profile;
pub mod snapshot;
pub mod summary;
pub mod transaction;
