use chrono::{NaiveDate, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::category::Category;
use crate::models::goal::Goal;
use crate::models::transaction::{
    normalize_label, Transaction, TransactionDraft, TransactionType, DEFAULT_CATEGORY,
    VAULT_WITHDRAWAL_CATEGORY,
};

/// Description used for vault withdrawals not tied to a goal.
pub const GENERIC_WITHDRAWAL_DESCRIPTION: &str = "RESGATE COFRE";

/// Turns user input into valid records before anything reaches persistence.
///
/// Pure business logic, no I/O. Every rejection is a
/// `CoreError::Validation` and aborts the operation.
pub struct IngestionService;

impl IngestionService {
    pub fn new() -> Self {
        Self
    }

    /// Validate a draft and build the transaction to insert.
    ///
    /// Rules:
    /// - amount must be present, finite and positive
    /// - description must not be blank
    /// - description and category are trimmed and uppercased; blank category → `GERAL`
    /// - new transactions always start pending (`settled = false`)
    pub fn build_transaction(
        &self,
        draft: &TransactionDraft,
        user_id: Uuid,
    ) -> Result<Transaction, CoreError> {
        let amount = Self::validate_amount(draft.amount)?;

        let description = normalize_label(&draft.description);
        if description.is_empty() {
            warn!("rejected transaction with empty description");
            return Err(CoreError::Validation(
                "Transaction description must not be empty".into(),
            ));
        }

        let category = match normalize_label(&draft.category) {
            c if c.is_empty() => DEFAULT_CATEGORY.to_string(),
            c => c,
        };

        Ok(Transaction {
            id: Uuid::new_v4(),
            description,
            amount,
            kind: draft.kind,
            category,
            date: draft.date,
            settled: false,
            user_id,
            goal_id: draft.goal_id,
        })
    }

    /// Build a vault withdrawal: an inflow in the reserved withdrawal
    /// category, settled immediately and dated `today`.
    pub fn build_vault_withdrawal(
        &self,
        amount: f64,
        goal: Option<&Goal>,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Transaction, CoreError> {
        let amount = Self::validate_amount(Some(amount))?;

        let description = goal
            .map(|g| normalize_label(&g.name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| GENERIC_WITHDRAWAL_DESCRIPTION.to_string());

        Ok(Transaction {
            id: Uuid::new_v4(),
            description,
            amount,
            kind: TransactionType::Inflow,
            category: VAULT_WITHDRAWAL_CATEGORY.to_string(),
            date: today,
            settled: true,
            user_id,
            goal_id: goal.map(|g| g.id),
        })
    }

    /// Validate and build a new savings goal.
    pub fn build_goal(&self, name: &str, target_amount: f64, user_id: Uuid) -> Result<Goal, CoreError> {
        let name = normalize_label(name);
        if name.is_empty() {
            warn!("rejected goal with empty name");
            return Err(CoreError::Validation("Goal name must not be empty".into()));
        }
        if !target_amount.is_finite() || target_amount <= 0.0 {
            warn!(target_amount, "rejected goal with non-positive target");
            return Err(CoreError::Validation(
                "Goal target amount must be positive".into(),
            ));
        }

        Ok(Goal {
            id: Uuid::new_v4(),
            name,
            target_amount,
            user_id,
            created_at: Utc::now(),
        })
    }

    /// Validate and build a new category.
    pub fn build_category(&self, name: &str) -> Result<Category, CoreError> {
        if name.trim().is_empty() {
            warn!("rejected category with empty name");
            return Err(CoreError::Validation("Category name must not be empty".into()));
        }
        Ok(Category::new(name))
    }

    fn validate_amount(amount: Option<f64>) -> Result<f64, CoreError> {
        match amount {
            Some(value) if value.is_finite() && value > 0.0 => Ok(value),
            Some(value) => {
                warn!(amount = value, "rejected non-positive amount");
                Err(CoreError::Validation(format!(
                    "Amount must be a positive number, got {value}"
                )))
            }
            None => {
                warn!("rejected missing amount");
                Err(CoreError::Validation("Amount is required".into()))
            }
        }
    }
}

impl Default for IngestionService {
    fn default() -> Self {
        Self::new()
    }
}
