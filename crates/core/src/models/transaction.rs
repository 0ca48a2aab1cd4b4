use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category name reserved for money coming back out of the vault.
pub const VAULT_WITHDRAWAL_CATEGORY: &str = "SAQUE COFRE";

/// Category names whose outflows are deposits into the vault.
pub const VAULT_DEPOSIT_CATEGORIES: [&str; 3] = ["POUPANÇA", "INVESTIMENTO", "CAIXINHA"];

/// Category assigned when the user leaves the field empty.
pub const DEFAULT_CATEGORY: &str = "GERAL";

/// Trim and uppercase a free-text label (descriptions, category and goal names).
pub fn normalize_label(label: &str) -> String {
    label.trim().to_uppercase()
}

/// Direction of a transaction. Serialized with the backend's own labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money coming in (`Entrada`)
    #[serde(rename = "Entrada")]
    Inflow,
    /// Money going out (`Saída`)
    #[serde(rename = "Saída")]
    Outflow,
}

impl TransactionType {
    /// `+amount` for inflows, `-amount` for outflows.
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            TransactionType::Inflow => amount,
            TransactionType::Outflow => -amount,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Inflow => write!(f, "Entrada"),
            TransactionType::Outflow => write!(f, "Saída"),
        }
    }
}

/// What a category name means to the vault bookkeeping.
///
/// The backend only stores the display name; the kind is derived from it
/// so the reserved names never leak into business logic as string checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryKind {
    /// Ordinary income/expense category
    Normal,
    /// `POUPANÇA`, `INVESTIMENTO` or `CAIXINHA`
    VaultDeposit,
    /// `SAQUE COFRE`
    VaultWithdrawal,
}

impl CategoryKind {
    /// Classify a category display name (case and surrounding whitespace ignored).
    pub fn classify(name: &str) -> Self {
        let name = normalize_label(name);
        if name == VAULT_WITHDRAWAL_CATEGORY {
            CategoryKind::VaultWithdrawal
        } else if VAULT_DEPOSIT_CATEGORIES.contains(&name.as_str()) {
            CategoryKind::VaultDeposit
        } else {
            CategoryKind::Normal
        }
    }

    /// True for both deposit and withdrawal kinds.
    pub fn is_vault(self) -> bool {
        !matches!(self, CategoryKind::Normal)
    }
}

/// A single income/expense entry (`transacao`).
///
/// Field names on the wire follow the hosted backend's columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: Uuid,

    /// Free-text label, uppercase and trimmed
    #[serde(rename = "descricao")]
    pub description: String,

    /// Amount (always positive; direction comes from `kind`)
    #[serde(rename = "valor")]
    pub amount: f64,

    /// Inflow or outflow
    #[serde(rename = "tipo")]
    pub kind: TransactionType,

    /// Category display name, uppercase and trimmed
    #[serde(rename = "categoria", default = "default_category", with = "nullable_category")]
    pub category: String,

    /// Calendar date (no time component)
    #[serde(rename = "data", deserialize_with = "calendar_date::deserialize")]
    pub date: NaiveDate,

    /// Whether the entry has cleared and counts toward realized balances
    #[serde(rename = "pago")]
    pub settled: bool,

    /// Owner
    pub user_id: Uuid,

    /// Explicit link to a savings goal. Legacy rows carry none and are
    /// matched to goals by description instead.
    #[serde(default)]
    pub goal_id: Option<Uuid>,
}

impl Transaction {
    /// Vault meaning of this transaction's category.
    pub fn category_kind(&self) -> CategoryKind {
        CategoryKind::classify(&self.category)
    }

    /// Amount with the sign of its direction.
    pub fn signed_amount(&self) -> f64 {
        self.kind.signed(self.amount)
    }

    pub fn is_inflow(&self) -> bool {
        self.kind == TransactionType::Inflow
    }
}

/// A proposed transaction as entered by the user, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub description: String,
    /// `None` when the amount field was left empty
    pub amount: Option<f64>,
    pub kind: TransactionType,
    /// Empty means "use the default category"
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub goal_id: Option<Uuid>,
}

impl TransactionDraft {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        kind: TransactionType,
        date: NaiveDate,
    ) -> Self {
        Self {
            description: description.into(),
            amount: Some(amount),
            kind,
            category: String::new(),
            date,
            goal_id: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_goal(mut self, goal_id: Uuid) -> Self {
        self.goal_id = Some(goal_id);
        self
    }
}

/// Lenient date decoding for the `data` column.
///
/// Accepts a plain `YYYY-MM-DD` as well as a full timestamp, keeping the
/// calendar date exactly as written. No offset is ever applied, so a
/// transaction cannot drift to a neighbouring day.
pub(crate) mod calendar_date {
    use chrono::NaiveDate;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid calendar date '{raw}'")))
    }
}

pub use calendar_date::parse as parse_calendar_date;

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// The `categoria` column is nullable; a missing or blank value reads as
/// [`DEFAULT_CATEGORY`]. Written as an option so binary snapshots decode
/// through the same path.
pub(crate) mod nullable_category {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DEFAULT_CATEGORY;

    pub fn serialize<S>(category: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_some(category)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()))
    }
}
