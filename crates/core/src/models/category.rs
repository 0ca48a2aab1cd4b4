use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transaction::{normalize_label, CategoryKind};

/// A user-visible category (`categoria`).
///
/// Transactions reference categories by name only, so removing a category
/// leaves existing transactions untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,

    /// Display name, uppercase
    #[serde(rename = "nome")]
    pub name: String,
}

impl Category {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: normalize_label(name),
        }
    }

    pub fn kind(&self) -> CategoryKind {
        CategoryKind::classify(&self.name)
    }
}
