pub mod backend;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use backend::{
    gotrue::GoTrueIdentity,
    memory::{MemoryIdentity, MemoryStore},
    postgrest::PostgrestStore,
    traits::{FinanceStore, IdentityProvider},
};
use config::BackendConfig;
use errors::CoreError;
use models::{
    category::Category,
    goal::{Goal, GoalProgress},
    profile::{CurrentUser, ProfilePatch, ResolvedProfile, UserProfile},
    snapshot::FinanceSnapshot,
    summary::{FinanceSummary, ReportingPeriod},
    transaction::{Transaction, TransactionDraft},
};
use services::{
    aggregator_service::AggregatorService, goal_service::GoalService,
    ingestion_service::IngestionService,
};
use storage::manager::StorageManager;

/// Main entry point for the finance vault core library.
///
/// Holds the backend collaborators, the services, and the last snapshot
/// loaded for the signed-in user. Every projection reads that snapshot;
/// every mutation goes to the store and is followed by a full [`reload`].
///
/// [`reload`]: FinanceTracker::reload
#[must_use]
pub struct FinanceTracker {
    store: Box<dyn FinanceStore>,
    identity: Box<dyn IdentityProvider>,
    aggregator: AggregatorService,
    ingestion: IngestionService,
    goal_service: GoalService,
    snapshot: FinanceSnapshot,
    user: Option<CurrentUser>,
}

impl std::fmt::Debug for FinanceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinanceTracker")
            .field("store", &self.store.name())
            .field("identity", &self.identity.name())
            .field("user", &self.user.as_ref().map(|u| u.id))
            .field("transactions", &self.snapshot.transactions.len())
            .field("categories", &self.snapshot.categories.len())
            .field("goals", &self.snapshot.goals.len())
            .finish()
    }
}

impl FinanceTracker {
    /// Tracker over arbitrary collaborators. Nothing is loaded until [`FinanceTracker::reload`].
    pub fn new(store: Box<dyn FinanceStore>, identity: Box<dyn IdentityProvider>) -> Self {
        Self {
            store,
            identity,
            aggregator: AggregatorService::new(),
            ingestion: IngestionService::new(),
            goal_service: GoalService::new(),
            snapshot: FinanceSnapshot::default(),
            user: None,
        }
    }

    /// Tracker talking to the hosted backend (PostgREST data + GoTrue auth).
    pub fn connect(config: BackendConfig) -> Self {
        Self::new(
            Box::new(PostgrestStore::new(config.clone())),
            Box::new(GoTrueIdentity::new(config)),
        )
    }

    /// Empty in-process tracker with `user` signed in.
    pub fn in_memory(user: CurrentUser) -> Self {
        Self::new(
            Box::new(MemoryStore::new()),
            Box::new(MemoryIdentity::signed_in(user)),
        )
    }

    /// In-process tracker seeded with an existing snapshot (offline mode).
    ///
    /// The snapshot's profile becomes the user's metadata, and the snapshot
    /// is readable immediately without a reload.
    pub fn offline(snapshot: FinanceSnapshot, mut user: CurrentUser) -> Self {
        user.metadata = snapshot.profile.clone();
        let mut tracker = Self::new(
            Box::new(MemoryStore::from_snapshot(snapshot.clone())),
            Box::new(MemoryIdentity::signed_in(user.clone())),
        );
        tracker.snapshot = snapshot;
        tracker.user = Some(user);
        tracker
    }

    // ── Loading ─────────────────────────────────────────────────────

    /// Replace the snapshot with fresh data for the current user.
    ///
    /// Fails with `Unauthenticated` when the identity provider reports no
    /// session; the previous snapshot is dropped in that case.
    pub async fn reload(&mut self) -> Result<(), CoreError> {
        let user = match self.identity.current_user().await? {
            Some(user) => user,
            None => {
                warn!("reload without a signed-in user");
                self.user = None;
                self.snapshot = FinanceSnapshot::default();
                return Err(CoreError::Unauthenticated);
            }
        };

        let transactions = self.store.list_transactions(user.id).await?;
        let categories = self.store.list_categories().await?;
        let goals = self.store.list_goals(user.id).await?;

        debug!(
            transactions = transactions.len(),
            categories = categories.len(),
            goals = goals.len(),
            "snapshot reloaded"
        );

        self.snapshot = FinanceSnapshot {
            transactions,
            categories,
            goals,
            profile: user.metadata.clone(),
        };
        self.user = Some(user);
        Ok(())
    }

    // ── Projections ─────────────────────────────────────────────────

    pub fn summary(&self, period: &ReportingPeriod) -> FinanceSummary {
        self.aggregator.summarize(&self.snapshot.transactions, period)
    }

    /// Whether the period's savings rate reached the profile's target.
    pub fn meets_savings_goal(&self, period: &ReportingPeriod) -> bool {
        self.summary(period)
            .meets_savings_goal(self.profile().savings_goal_percent)
    }

    /// Vault balance over the whole history.
    pub fn vault_total(&self) -> f64 {
        self.aggregator.vault_total(&self.snapshot.transactions)
    }

    pub fn goal_progress(&self) -> Vec<GoalProgress> {
        self.goal_service
            .progress_all(&self.snapshot.goals, &self.snapshot.transactions)
    }

    /// In-period transactions matching `query`, newest first.
    pub fn search_transactions(&self, period: &ReportingPeriod, query: &str) -> Vec<Transaction> {
        self.summary(period)
            .search_period(query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.snapshot.transactions
    }

    pub fn categories(&self) -> &[Category] {
        &self.snapshot.categories
    }

    pub fn goals(&self) -> &[Goal] {
        &self.snapshot.goals
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    /// Profile with defaults applied (defaults only when signed out).
    pub fn profile(&self) -> ResolvedProfile {
        match &self.user {
            Some(user) => user.profile(),
            None => UserProfile::default().resolve(None),
        }
    }

    pub fn snapshot(&self) -> &FinanceSnapshot {
        &self.snapshot
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Validate and persist a new transaction (always pending).
    pub async fn add_transaction(&mut self, draft: TransactionDraft) -> Result<Uuid, CoreError> {
        let user_id = self.user_id()?;
        if let Some(goal_id) = draft.goal_id {
            self.find_goal(goal_id)?;
        }
        let transaction = self.ingestion.build_transaction(&draft, user_id)?;
        let id = transaction.id;

        self.store.insert_transaction(&transaction).await?;
        info!(%id, kind = %transaction.kind, amount = transaction.amount, "transaction added");
        self.reload().await?;
        Ok(id)
    }

    /// Move money out of the vault back into the balance, dated today (UTC).
    /// With a goal, the withdrawal is linked to it and reduces its progress.
    pub async fn withdraw_from_vault(
        &mut self,
        amount: f64,
        goal_id: Option<Uuid>,
    ) -> Result<Uuid, CoreError> {
        self.withdraw_from_vault_on(amount, goal_id, Utc::now().date_naive())
            .await
    }

    /// [`FinanceTracker::withdraw_from_vault`] with an explicit date.
    pub async fn withdraw_from_vault_on(
        &mut self,
        amount: f64,
        goal_id: Option<Uuid>,
        date: NaiveDate,
    ) -> Result<Uuid, CoreError> {
        let user_id = self.user_id()?;
        let goal = goal_id.map(|id| self.find_goal(id)).transpose()?;
        let transaction = self
            .ingestion
            .build_vault_withdrawal(amount, goal, user_id, date)?;
        let id = transaction.id;

        self.store.insert_transaction(&transaction).await?;
        info!(%id, amount, goal = ?goal_id, "vault withdrawal recorded");
        self.reload().await?;
        Ok(id)
    }

    pub async fn set_settled(&mut self, id: Uuid, settled: bool) -> Result<(), CoreError> {
        self.user_id()?;
        self.find_transaction(id)?;
        self.store.update_transaction_settled(id, settled).await?;
        info!(%id, settled, "settled flag updated");
        self.reload().await
    }

    /// Flip the settled flag; returns the new value.
    pub async fn toggle_settled(&mut self, id: Uuid) -> Result<bool, CoreError> {
        let settled = !self.find_transaction(id)?.settled;
        self.set_settled(id, settled).await?;
        Ok(settled)
    }

    pub async fn delete_transaction(&mut self, id: Uuid) -> Result<(), CoreError> {
        self.user_id()?;
        self.find_transaction(id)?;
        self.store.delete_transaction(id).await?;
        info!(%id, "transaction deleted");
        self.reload().await
    }

    // ── Goals ───────────────────────────────────────────────────────

    pub async fn add_goal(&mut self, name: &str, target_amount: f64) -> Result<Uuid, CoreError> {
        let user_id = self.user_id()?;
        let goal = self.ingestion.build_goal(name, target_amount, user_id)?;
        let id = goal.id;

        self.store.insert_goal(&goal).await?;
        info!(%id, name = %goal.name, "goal added");
        self.reload().await?;
        Ok(id)
    }

    /// Remove a goal. Transactions linked to it are kept as they are.
    pub async fn delete_goal(&mut self, id: Uuid) -> Result<(), CoreError> {
        self.user_id()?;
        self.find_goal(id)?;
        self.store.delete_goal(id).await?;
        info!(%id, "goal deleted");
        self.reload().await
    }

    /// Write explicit goal links for legacy transactions matched by name.
    /// Returns how many transactions were linked.
    pub async fn backfill_goal_links(&mut self) -> Result<usize, CoreError> {
        self.user_id()?;
        let links = self
            .goal_service
            .backfill_links(&self.snapshot.goals, &self.snapshot.transactions);
        if links.is_empty() {
            return Ok(0);
        }

        let mut written = 0;
        for link in &links {
            if let Err(err) = self
                .store
                .update_transaction_goal(link.transaction_id, Some(link.goal_id))
                .await
            {
                warn!(written, error = %err, "goal link backfill interrupted");
                // Links written so far stay; the snapshot must show them
                if written > 0 {
                    self.reload().await?;
                }
                return Err(err);
            }
            written += 1;
        }
        info!(links = written, "goal links backfilled");
        self.reload().await?;
        Ok(written)
    }

    // ── Categories ──────────────────────────────────────────────────

    pub async fn add_category(&mut self, name: &str) -> Result<Uuid, CoreError> {
        self.user_id()?;
        let category = self.ingestion.build_category(name)?;
        if self.snapshot.categories.iter().any(|c| c.name == category.name) {
            warn!(name = %category.name, "rejected duplicate category");
            return Err(CoreError::Validation(format!(
                "Category '{}' already exists",
                category.name
            )));
        }
        let id = category.id;

        self.store.insert_category(&category).await?;
        info!(%id, name = %category.name, "category added");
        self.reload().await?;
        Ok(id)
    }

    pub async fn delete_category(&mut self, id: Uuid) -> Result<(), CoreError> {
        self.user_id()?;
        if !self.snapshot.categories.iter().any(|c| c.id == id) {
            return Err(CoreError::not_found("Category", id));
        }
        self.store.delete_category(id).await?;
        info!(%id, "category deleted");
        self.reload().await
    }

    // ── Profile ─────────────────────────────────────────────────────

    /// Merge `patch` into the user's profile metadata.
    pub async fn update_profile(&mut self, patch: ProfilePatch) -> Result<ResolvedProfile, CoreError> {
        self.user_id()?;
        if patch.is_empty() {
            return Ok(self.profile());
        }
        if let Some(percent) = patch.savings_goal_percent {
            // A zero target resolves to the default, so it is not storable
            if !percent.is_finite() || percent <= 0.0 || percent > 100.0 {
                warn!(percent, "rejected savings goal outside (0, 100]");
                return Err(CoreError::Validation(format!(
                    "Savings goal must be above 0 and at most 100, got {percent}"
                )));
            }
        }
        if let Some(name) = &patch.display_name {
            if name.trim().is_empty() {
                return Err(CoreError::Validation("Display name must not be empty".into()));
            }
        }

        let updated = self.identity.update_user_metadata(&patch).await?;
        info!(user = %updated.id, "profile updated");
        self.reload().await?;
        Ok(self.profile())
    }

    // ── Offline snapshots ───────────────────────────────────────────

    /// Encrypt the loaded snapshot. Returns raw bytes the caller can write anywhere.
    pub fn save_snapshot_to_bytes(&self, password: &str) -> Result<Vec<u8>, CoreError> {
        StorageManager::save_to_bytes(&self.snapshot, password)
    }

    /// Decrypt a snapshot and open it offline for `user`.
    pub fn load_snapshot_from_bytes(
        encrypted: &[u8],
        password: &str,
        user: CurrentUser,
    ) -> Result<Self, CoreError> {
        let snapshot = StorageManager::load_from_bytes(encrypted, password)?;
        Ok(Self::offline(snapshot, user))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_snapshot_to_file(
        &self,
        path: impl AsRef<std::path::Path>,
        password: &str,
    ) -> Result<(), CoreError> {
        StorageManager::save_to_file(&self.snapshot, path, password)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_snapshot_from_file(
        path: impl AsRef<std::path::Path>,
        password: &str,
        user: CurrentUser,
    ) -> Result<Self, CoreError> {
        let snapshot = StorageManager::load_from_file(path, password)?;
        Ok(Self::offline(snapshot, user))
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn user_id(&self) -> Result<Uuid, CoreError> {
        self.user
            .as_ref()
            .map(|u| u.id)
            .ok_or(CoreError::Unauthenticated)
    }

    fn find_transaction(&self, id: Uuid) -> Result<&Transaction, CoreError> {
        self.snapshot
            .transactions
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::not_found("Transaction", id))
    }

    fn find_goal(&self, id: Uuid) -> Result<&Goal, CoreError> {
        self.snapshot
            .goals
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| CoreError::not_found("Goal", id))
    }
}
