use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::category::Category;
use crate::models::goal::Goal;
use crate::models::profile::{CurrentUser, ProfilePatch};
use crate::models::snapshot::FinanceSnapshot;
use crate::models::transaction::Transaction;
use crate::services::ledger_service::LedgerService;

use super::traits::{FinanceStore, IdentityProvider};

const MEMORY_BACKEND: &str = "Memory";

fn poisoned() -> CoreError {
    CoreError::Api {
        backend: MEMORY_BACKEND.into(),
        message: "state lock poisoned".into(),
    }
}

/// In-process store backed by a `FinanceSnapshot`.
///
/// Used for offline mode (seeded from a decrypted snapshot file) and in
/// tests. Holds every user's records; lists filter by owner.
pub struct MemoryStore {
    state: Mutex<FinanceSnapshot>,
    ledger: LedgerService,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_snapshot(FinanceSnapshot::default())
    }

    /// Seed the store with existing records. Orderings are restored on the way in.
    pub fn from_snapshot(mut snapshot: FinanceSnapshot) -> Self {
        snapshot.transactions.sort_by_key(|t| t.date);
        snapshot.categories.sort_by(|a, b| a.name.cmp(&b.name));
        snapshot.goals.sort_by_key(|g| g.created_at);
        Self {
            state: Mutex::new(snapshot),
            ledger: LedgerService::new(),
        }
    }

    /// Copy of everything currently stored.
    pub fn snapshot(&self) -> Result<FinanceSnapshot, CoreError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, FinanceSnapshot>, CoreError> {
        self.state.lock().map_err(|_| poisoned())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl FinanceStore for MemoryStore {
    fn name(&self) -> &str {
        MEMORY_BACKEND
    }

    async fn list_transactions(&self, user_id: Uuid) -> Result<Vec<Transaction>, CoreError> {
        let state = self.lock()?;
        Ok(state
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CoreError> {
        Ok(self.lock()?.categories.clone())
    }

    async fn list_goals(&self, user_id: Uuid) -> Result<Vec<Goal>, CoreError> {
        let state = self.lock()?;
        Ok(state
            .goals
            .iter()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_transaction(&self, transaction: &Transaction) -> Result<(), CoreError> {
        debug!(id = %transaction.id, "memory: insert transaction");
        let mut state = self.lock()?;
        self.ledger.insert_transaction(&mut state, transaction.clone())
    }

    async fn update_transaction_settled(&self, id: Uuid, settled: bool) -> Result<(), CoreError> {
        let mut state = self.lock()?;
        self.ledger.set_settled(&mut state, id, settled)
    }

    async fn update_transaction_goal(&self, id: Uuid, goal_id: Option<Uuid>) -> Result<(), CoreError> {
        let mut state = self.lock()?;
        self.ledger.set_goal_link(&mut state, id, goal_id)
    }

    async fn delete_transaction(&self, id: Uuid) -> Result<(), CoreError> {
        let mut state = self.lock()?;
        self.ledger.remove_transaction(&mut state, id).map(|_| ())
    }

    async fn insert_goal(&self, goal: &Goal) -> Result<(), CoreError> {
        let mut state = self.lock()?;
        self.ledger.insert_goal(&mut state, goal.clone());
        Ok(())
    }

    async fn delete_goal(&self, id: Uuid) -> Result<(), CoreError> {
        let mut state = self.lock()?;
        self.ledger.remove_goal(&mut state, id).map(|_| ())
    }

    async fn insert_category(&self, category: &Category) -> Result<(), CoreError> {
        let mut state = self.lock()?;
        self.ledger.insert_category(&mut state, category.clone());
        Ok(())
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), CoreError> {
        let mut state = self.lock()?;
        self.ledger.remove_category(&mut state, id).map(|_| ())
    }
}

/// In-process identity: a fixed user, or nobody.
pub struct MemoryIdentity {
    user: Mutex<Option<CurrentUser>>,
}

impl MemoryIdentity {
    pub fn signed_in(user: CurrentUser) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            user: Mutex::new(None),
        }
    }

    /// End the session; later lookups report no user.
    pub fn sign_out(&self) -> Result<(), CoreError> {
        *self.user.lock().map_err(|_| poisoned())? = None;
        Ok(())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl IdentityProvider for MemoryIdentity {
    fn name(&self) -> &str {
        MEMORY_BACKEND
    }

    async fn current_user(&self) -> Result<Option<CurrentUser>, CoreError> {
        Ok(self.user.lock().map_err(|_| poisoned())?.clone())
    }

    async fn update_user_metadata(&self, patch: &ProfilePatch) -> Result<CurrentUser, CoreError> {
        let mut guard = self.user.lock().map_err(|_| poisoned())?;
        let user = guard.as_mut().ok_or(CoreError::Unauthenticated)?;
        user.metadata.apply(patch);
        Ok(user.clone())
    }
}
