use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::category::Category;
use crate::models::goal::Goal;
use crate::models::profile::{CurrentUser, ProfilePatch};
use crate::models::transaction::Transaction;

/// Persistence collaborator: stores and retrieves one user's records.
///
/// Implementations own ordering: lists come back sorted the way the
/// dashboard reads them. Writes are last-write-wins.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait FinanceStore: Send + Sync {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// All of the user's transactions, oldest date first.
    async fn list_transactions(&self, user_id: Uuid) -> Result<Vec<Transaction>, CoreError>;

    /// All categories, by name.
    async fn list_categories(&self) -> Result<Vec<Category>, CoreError>;

    /// All of the user's goals, oldest first.
    async fn list_goals(&self, user_id: Uuid) -> Result<Vec<Goal>, CoreError>;

    async fn insert_transaction(&self, transaction: &Transaction) -> Result<(), CoreError>;

    /// Partial update of the settled flag only.
    async fn update_transaction_settled(&self, id: Uuid, settled: bool) -> Result<(), CoreError>;

    /// Partial update of the explicit goal link only.
    async fn update_transaction_goal(&self, id: Uuid, goal_id: Option<Uuid>) -> Result<(), CoreError>;

    async fn delete_transaction(&self, id: Uuid) -> Result<(), CoreError>;

    async fn insert_goal(&self, goal: &Goal) -> Result<(), CoreError>;

    async fn delete_goal(&self, id: Uuid) -> Result<(), CoreError>;

    async fn insert_category(&self, category: &Category) -> Result<(), CoreError>;

    async fn delete_category(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Identity collaborator: who is signed in, and their profile metadata.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait IdentityProvider: Send + Sync {
    fn name(&self) -> &str;

    /// The signed-in user, or `None` when there is no valid session.
    async fn current_user(&self) -> Result<Option<CurrentUser>, CoreError>;

    /// Merge `patch` into the user's metadata; returns the updated user.
    async fn update_user_metadata(&self, patch: &ProfilePatch) -> Result<CurrentUser, CoreError>;
}
