use tracing::debug;

use crate::models::goal::{Goal, GoalLink, GoalProgress};
use crate::models::transaction::{normalize_label, Transaction, TransactionType};

/// Projects savings-goal progress from the transaction history.
///
/// Deposits toward a goal are outflows (money leaves the account into the
/// goal); withdrawals are inflows. Only settled transactions count.
pub struct GoalService;

impl GoalService {
    pub fn new() -> Self {
        Self
    }

    /// Progress of a single goal.
    pub fn progress(&self, goal: &Goal, transactions: &[Transaction]) -> GoalProgress {
        let accumulated: f64 = transactions
            .iter()
            .filter(|t| t.settled && goal.is_linked(t))
            .map(|t| match t.kind {
                TransactionType::Outflow => t.amount,
                TransactionType::Inflow => -t.amount,
            })
            .sum();

        let progress_percent = if goal.target_amount > 0.0 {
            (accumulated / goal.target_amount * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        GoalProgress {
            goal_id: goal.id,
            name: goal.name.clone(),
            target_amount: goal.target_amount,
            accumulated,
            progress_percent,
        }
    }

    /// Progress of every goal, in the goals' order.
    pub fn progress_all(&self, goals: &[Goal], transactions: &[Transaction]) -> Vec<GoalProgress> {
        goals
            .iter()
            .map(|goal| self.progress(goal, transactions))
            .collect()
    }

    /// One-time migration from name matching to explicit links.
    ///
    /// Every transaction without a `goal_id` whose normalized description
    /// equals exactly one goal's normalized name gets linked to that goal.
    /// Ambiguous names (several goals with the same name) are left alone.
    pub fn backfill_links(&self, goals: &[Goal], transactions: &[Transaction]) -> Vec<GoalLink> {
        let links: Vec<GoalLink> = transactions
            .iter()
            .filter(|t| t.goal_id.is_none())
            .filter_map(|t| {
                let description = normalize_label(&t.description);
                let mut matches = goals
                    .iter()
                    .filter(|g| normalize_label(&g.name) == description);
                match (matches.next(), matches.next()) {
                    (Some(goal), None) => Some(GoalLink {
                        transaction_id: t.id,
                        goal_id: goal.id,
                    }),
                    _ => None,
                }
            })
            .collect();

        debug!(links = links.len(), "computed goal link backfill");
        links
    }
}

impl Default for GoalService {
    fn default() -> Self {
        Self::new()
    }
}
