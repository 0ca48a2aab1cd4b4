use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transaction::{normalize_label, Transaction};

/// A savings target (`meta`). Progress is never stored; see `GoalService`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,

    /// Goal name, uppercase and trimmed
    #[serde(rename = "nome")]
    pub name: String,

    /// Amount the user wants to reach
    #[serde(rename = "valor_objetivo")]
    pub target_amount: f64,

    pub user_id: Uuid,

    pub created_at: DateTime<Utc>,
}

impl Goal {
    /// Whether a transaction belongs to this goal.
    ///
    /// An explicit `goal_id` always wins; rows without one fall back to
    /// exact equality of the normalized description and goal name.
    pub fn is_linked(&self, transaction: &Transaction) -> bool {
        match transaction.goal_id {
            Some(id) => id == self.id,
            None => normalize_label(&transaction.description) == normalize_label(&self.name),
        }
    }
}

/// Derived progress of one goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal_id: Uuid,
    pub name: String,
    pub target_amount: f64,
    /// Settled deposits minus settled withdrawals linked to the goal
    pub accumulated: f64,
    /// `accumulated / target_amount * 100`, clamped to 0..=100
    pub progress_percent: f64,
}

impl GoalProgress {
    pub fn is_complete(&self) -> bool {
        self.progress_percent >= 100.0
    }

    /// What is still missing to reach the target (never negative).
    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.accumulated).max(0.0)
    }
}

/// A goal link produced by the description-matching backfill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalLink {
    pub transaction_id: Uuid,
    pub goal_id: Uuid,
}
