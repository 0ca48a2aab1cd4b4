use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::BackendConfig;
use crate::errors::CoreError;
use crate::models::category::Category;
use crate::models::goal::Goal;
use crate::models::transaction::{Transaction, TransactionType};

use super::traits::FinanceStore;

const BACKEND_NAME: &str = "PostgREST";

pub const TRANSACTIONS_TABLE: &str = "transacoes";
pub const CATEGORIES_TABLE: &str = "categorias";
pub const GOALS_TABLE: &str = "metas";

/// Data store on a hosted PostgREST endpoint (`{url}/rest/v1/{table}`).
///
/// - **Auth**: `apikey` header plus bearer session token; row-level
///   security on the server scopes rows to the signed-in user.
/// - **Reads**: `select=*` with `col=eq.value` filters and `order=col.asc`.
/// - **Writes**: inserts as JSON arrays, partial updates via `PATCH`.
pub struct PostgrestStore {
    client: Client,
    config: BackendConfig,
}

impl PostgrestStore {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: config.http_client(),
            config,
        }
    }

    /// Row-addressing URL: `{rest}/{table}?col=eq.value&...`.
    pub fn table_url(&self, table: &str, filters: &[(&str, String)]) -> String {
        let base = format!("{}/{table}", self.config.rest_url());
        if filters.is_empty() {
            return base;
        }
        let query: Vec<String> = filters
            .iter()
            .map(|(column, value)| format!("{column}={value}"))
            .collect();
        format!("{base}?{}", query.join("&"))
    }

    /// Read URL: every column, filtered, ascending by `order_by`.
    pub fn select_url(&self, table: &str, filters: &[(&str, String)], order_by: &str) -> String {
        let mut query = vec!["select=*".to_string()];
        query.extend(filters.iter().map(|(column, value)| format!("{column}={value}")));
        query.push(format!("order={order_by}.asc"));
        format!("{}/{table}?{}", self.config.rest_url(), query.join("&"))
    }

    /// `eq.` filter value for an id column.
    pub fn eq(id: Uuid) -> String {
        format!("eq.{id}")
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .header("Authorization", self.config.bearer())
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, CoreError> {
        debug!(operation = what, "postgrest request");
        let response = self.authorize(request).send().await?;
        Self::check(response, what).await
    }

    async fn check(response: Response, what: &str) -> Result<Response, CoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            warn!(operation = what, "postgrest rejected the session");
            return Err(CoreError::Unauthenticated);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(operation = what, %status, "postgrest request failed");
        Err(CoreError::Api {
            backend: BACKEND_NAME.into(),
            message: format!("{what} failed with {status}: {body}"),
        })
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, url: String, what: &str) -> Result<Vec<T>, CoreError> {
        self.send(self.client.get(url), what)
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                backend: BACKEND_NAME.into(),
                message: format!("Failed to parse {what} response: {e}"),
            })
    }

    async fn insert<T: Serialize + Sync>(&self, table: &str, row: &T, what: &str) -> Result<(), CoreError> {
        let request = self
            .client
            .post(self.table_url(table, &[]))
            .header("Prefer", "return=minimal")
            .json(&[row]);
        self.send(request, what).await.map(|_| ())
    }

    async fn patch<T: Serialize + Sync>(&self, table: &str, id: Uuid, body: &T, what: &str) -> Result<(), CoreError> {
        let request = self
            .client
            .patch(self.table_url(table, &[("id", Self::eq(id))]))
            .header("Prefer", "return=minimal")
            .json(body);
        self.send(request, what).await.map(|_| ())
    }

    async fn delete(&self, table: &str, id: Uuid, what: &str) -> Result<(), CoreError> {
        let request = self
            .client
            .delete(self.table_url(table, &[("id", Self::eq(id))]));
        self.send(request, what).await.map(|_| ())
    }
}

// ── Wire row shapes ─────────────────────────────────────────────────

/// Insert payload for `transacoes`. `goal_id` is left out when unset so
/// inserts keep working against tables created before the column existed.
#[derive(Serialize)]
pub struct TransactionRow<'a> {
    pub id: Uuid,
    pub descricao: &'a str,
    pub valor: f64,
    pub tipo: TransactionType,
    pub categoria: &'a str,
    pub data: NaiveDate,
    pub pago: bool,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<Uuid>,
}

impl<'a> From<&'a Transaction> for TransactionRow<'a> {
    fn from(t: &'a Transaction) -> Self {
        Self {
            id: t.id,
            descricao: &t.description,
            valor: t.amount,
            tipo: t.kind,
            categoria: &t.category,
            data: t.date,
            pago: t.settled,
            user_id: t.user_id,
            goal_id: t.goal_id,
        }
    }
}

#[derive(Serialize)]
struct SettledPatch {
    pago: bool,
}

#[derive(Serialize)]
struct GoalLinkPatch {
    goal_id: Option<Uuid>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl FinanceStore for PostgrestStore {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn list_transactions(&self, user_id: Uuid) -> Result<Vec<Transaction>, CoreError> {
        let url = self.select_url(TRANSACTIONS_TABLE, &[("user_id", Self::eq(user_id))], "data");
        self.fetch(url, "list transactions").await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CoreError> {
        let url = self.select_url(CATEGORIES_TABLE, &[], "nome");
        self.fetch(url, "list categories").await
    }

    async fn list_goals(&self, user_id: Uuid) -> Result<Vec<Goal>, CoreError> {
        let url = self.select_url(GOALS_TABLE, &[("user_id", Self::eq(user_id))], "created_at");
        self.fetch(url, "list goals").await
    }

    async fn insert_transaction(&self, transaction: &Transaction) -> Result<(), CoreError> {
        self.insert(TRANSACTIONS_TABLE, &TransactionRow::from(transaction), "insert transaction")
            .await
    }

    async fn update_transaction_settled(&self, id: Uuid, settled: bool) -> Result<(), CoreError> {
        self.patch(TRANSACTIONS_TABLE, id, &SettledPatch { pago: settled }, "update settled flag")
            .await
    }

    async fn update_transaction_goal(&self, id: Uuid, goal_id: Option<Uuid>) -> Result<(), CoreError> {
        self.patch(TRANSACTIONS_TABLE, id, &GoalLinkPatch { goal_id }, "update goal link")
            .await
    }

    async fn delete_transaction(&self, id: Uuid) -> Result<(), CoreError> {
        self.delete(TRANSACTIONS_TABLE, id, "delete transaction").await
    }

    async fn insert_goal(&self, goal: &Goal) -> Result<(), CoreError> {
        self.insert(GOALS_TABLE, goal, "insert goal").await
    }

    async fn delete_goal(&self, id: Uuid) -> Result<(), CoreError> {
        self.delete(GOALS_TABLE, id, "delete goal").await
    }

    async fn insert_category(&self, category: &Category) -> Result<(), CoreError> {
        self.insert(CATEGORIES_TABLE, category, "insert category").await
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), CoreError> {
        self.delete(CATEGORIES_TABLE, id, "delete category").await
    }
}
