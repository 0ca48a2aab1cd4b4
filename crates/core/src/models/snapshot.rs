use serde::{Deserialize, Serialize};

use super::category::Category;
use super::goal::Goal;
use super::profile::UserProfile;
use super::transaction::Transaction;

/// One user's complete data set, as loaded from the backend.
///
/// This is what every projection runs over and what gets encrypted into an
/// offline snapshot file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinanceSnapshot {
    /// All transactions, oldest date first
    pub transactions: Vec<Transaction>,

    /// All categories, by name
    pub categories: Vec<Category>,

    /// All goals, oldest first
    pub goals: Vec<Goal>,

    /// Profile metadata at the time of the load
    #[serde(default)]
    pub profile: UserProfile,
}

impl FinanceSnapshot {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.categories.is_empty() && self.goals.is_empty()
    }
}
