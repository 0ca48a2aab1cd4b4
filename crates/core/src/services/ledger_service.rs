use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::category::Category;
use crate::models::goal::Goal;
use crate::models::snapshot::FinanceSnapshot;
use crate::models::transaction::Transaction;

/// In-memory record keeping over a `FinanceSnapshot`.
///
/// Keeps the orderings every reader relies on: transactions by date,
/// categories by name, goals by creation time. Equal keys keep insertion
/// order.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Insert a transaction after every transaction dated on or before it.
    pub fn insert_transaction(
        &self,
        snapshot: &mut FinanceSnapshot,
        transaction: Transaction,
    ) -> Result<(), CoreError> {
        if snapshot.transactions.iter().any(|t| t.id == transaction.id) {
            return Err(CoreError::Validation(format!(
                "Transaction {} already exists",
                transaction.id
            )));
        }
        let pos = snapshot
            .transactions
            .partition_point(|t| t.date <= transaction.date);
        snapshot.transactions.insert(pos, transaction);
        Ok(())
    }

    /// Mark a transaction settled or pending.
    pub fn set_settled(
        &self,
        snapshot: &mut FinanceSnapshot,
        transaction_id: Uuid,
        settled: bool,
    ) -> Result<(), CoreError> {
        let transaction = Self::find_transaction_mut(snapshot, transaction_id)?;
        transaction.settled = settled;
        Ok(())
    }

    /// Set or clear the explicit goal link of a transaction.
    pub fn set_goal_link(
        &self,
        snapshot: &mut FinanceSnapshot,
        transaction_id: Uuid,
        goal_id: Option<Uuid>,
    ) -> Result<(), CoreError> {
        let transaction = Self::find_transaction_mut(snapshot, transaction_id)?;
        transaction.goal_id = goal_id;
        Ok(())
    }

    /// Remove a transaction; returns it.
    pub fn remove_transaction(
        &self,
        snapshot: &mut FinanceSnapshot,
        transaction_id: Uuid,
    ) -> Result<Transaction, CoreError> {
        let idx = snapshot
            .transactions
            .iter()
            .position(|t| t.id == transaction_id)
            .ok_or_else(|| CoreError::not_found("Transaction", transaction_id))?;
        Ok(snapshot.transactions.remove(idx))
    }

    // ── Categories ──────────────────────────────────────────────────

    /// Insert a category keeping name order.
    pub fn insert_category(&self, snapshot: &mut FinanceSnapshot, category: Category) {
        let pos = snapshot
            .categories
            .partition_point(|c| c.name <= category.name);
        snapshot.categories.insert(pos, category);
    }

    /// Remove a category. Transactions using its name are left untouched.
    pub fn remove_category(
        &self,
        snapshot: &mut FinanceSnapshot,
        category_id: Uuid,
    ) -> Result<Category, CoreError> {
        let idx = snapshot
            .categories
            .iter()
            .position(|c| c.id == category_id)
            .ok_or_else(|| CoreError::not_found("Category", category_id))?;
        Ok(snapshot.categories.remove(idx))
    }

    // ── Goals ───────────────────────────────────────────────────────

    /// Insert a goal keeping creation order.
    pub fn insert_goal(&self, snapshot: &mut FinanceSnapshot, goal: Goal) {
        let pos = snapshot
            .goals
            .partition_point(|g| g.created_at <= goal.created_at);
        snapshot.goals.insert(pos, goal);
    }

    /// Remove a goal. Linked transactions keep their (now dangling) link.
    pub fn remove_goal(&self, snapshot: &mut FinanceSnapshot, goal_id: Uuid) -> Result<Goal, CoreError> {
        let idx = snapshot
            .goals
            .iter()
            .position(|g| g.id == goal_id)
            .ok_or_else(|| CoreError::not_found("Goal", goal_id))?;
        Ok(snapshot.goals.remove(idx))
    }

    fn find_transaction_mut(
        snapshot: &mut FinanceSnapshot,
        transaction_id: Uuid,
    ) -> Result<&mut Transaction, CoreError> {
        snapshot
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction_id)
            .ok_or_else(|| CoreError::not_found("Transaction", transaction_id))
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
