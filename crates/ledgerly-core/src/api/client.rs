//! API client for the finance tracker REST backend.
//!
//! `ApiClient` has one method per backend operation. All calls go through
//! the `Gateway`, so they carry the stored access credential and survive a
//! single credential renewal.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use super::gateway::Gateway;
use super::transport::{ApiRequest, HttpTransport, Transport};
use crate::auth::{Session, SessionStore, TokenPair};
use crate::models::{
    merge_recent, Account, AccountInput, ActivityEntry, CashflowMonth, Category, CategoryInput,
    CategoryTotal, Expense, Income, NewExpense, NewIncome, NewTransfer, ReportFilter, Summary,
    Transfer,
};

// ============================================================================
// Endpoints
// ============================================================================

const LOGIN_PATH: &str = "auth/login/";
const REGISTER_PATH: &str = "auth/register/";

const ACCOUNTS: &str = "accounts/";
const CATEGORIES: &str = "categories/";
const EXPENSES: &str = "expenses/";
const INCOMES: &str = "incomes/";
const TRANSFERS: &str = "transfers/";

const SUMMARY_PATH: &str = "summary/";
const MONTHLY_CASHFLOW_PATH: &str = "expenses/monthly-cashflow/";
const TOTALS_BY_CATEGORY_PATH: &str = "expenses/totals_by_category/";

/// API client for the finance tracker.
/// Clone is cheap - the gateway and its transport are shared.
#[derive(Clone)]
pub struct ApiClient {
    gateway: Arc<Gateway>,
}

impl ApiClient {
    /// Create a client talking HTTP to `base_url`.
    pub fn new(base_url: &str, store: Arc<dyn SessionStore>) -> Result<Self> {
        let transport = HttpTransport::new(base_url)?;
        Ok(Self::with_transport(Arc::new(transport), store))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            gateway: Arc::new(Gateway::new(transport, Session::new(store))),
        }
    }

    pub fn session(&self) -> &Session {
        self.gateway.session()
    }

    // ===== Authentication =====

    /// Log in and store the issued credential pair.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let tokens = self.authenticate(LOGIN_PATH, username, password).await?;
        self.session().begin(&tokens)?;
        info!(username, "Logged in");
        Ok(())
    }

    /// Create an account and store the issued credential pair.
    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        let tokens = self.authenticate(REGISTER_PATH, username, password).await?;
        self.session().begin(&tokens)?;
        info!(username, "Registered");
        Ok(())
    }

    /// Clear the stored credentials. Never fails; absent credentials are fine.
    pub fn logout(&self) {
        self.session().logout();
    }

    async fn authenticate(&self, path: &str, username: &str, password: &str) -> Result<TokenPair> {
        let request = ApiRequest::post(path)
            .with_json(serde_json::json!({ "username": username, "password": password }))
            .public();

        let response = self
            .gateway
            .send(request)
            .await
            .with_context(|| format!("Authentication request to {} failed", path))?;

        response
            .json()
            .context("Failed to parse authentication response")
    }

    // ===== Generic helpers =====

    async fn get<T: DeserializeOwned>(&self, path: &str, query: Vec<(String, String)>) -> Result<T> {
        let response = self
            .gateway
            .send(ApiRequest::get(path).with_query(query))
            .await
            .with_context(|| format!("GET {} failed", path))?;

        response
            .json()
            .with_context(|| format!("Failed to parse JSON response from {}", path))
    }

    async fn write<T: DeserializeOwned, B: Serialize>(
        &self,
        request: ApiRequest,
        body: &B,
    ) -> Result<T> {
        let path = request.path.clone();
        let method = request.method.clone();
        let body = serde_json::to_value(body).context("Failed to serialize request body")?;

        let response = self
            .gateway
            .send(request.with_json(body))
            .await
            .with_context(|| format!("{} {} failed", method, path))?;

        response
            .json()
            .with_context(|| format!("Failed to parse JSON response from {}", path))
    }

    async fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let items: Vec<T> = self.get(collection, Vec::new()).await?;
        debug!(collection, count = items.len(), "Fetched list");
        Ok(items)
    }

    async fn create<T: DeserializeOwned, B: Serialize>(&self, collection: &str, body: &B) -> Result<T> {
        self.write(ApiRequest::post(collection), body).await
    }

    async fn update<T: DeserializeOwned, B: Serialize>(
        &self,
        collection: &str,
        id: i64,
        body: &B,
    ) -> Result<T> {
        self.write(ApiRequest::put(item_path(collection, id)), body).await
    }

    async fn remove(&self, collection: &str, id: i64) -> Result<()> {
        let path = item_path(collection, id);
        self.gateway
            .send(ApiRequest::delete(path.clone()))
            .await
            .with_context(|| format!("DELETE {} failed", path))?;
        Ok(())
    }

    // ===== Accounts =====

    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.list(ACCOUNTS).await
    }

    pub async fn create_account(&self, name: &str) -> Result<Account> {
        self.create(ACCOUNTS, &AccountInput::new(name)).await
    }

    pub async fn update_account(&self, id: i64, name: &str) -> Result<Account> {
        self.update(ACCOUNTS, id, &AccountInput::new(name)).await
    }

    pub async fn delete_account(&self, id: i64) -> Result<()> {
        self.remove(ACCOUNTS, id).await
    }

    // ===== Categories =====

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.list(CATEGORIES).await
    }

    pub async fn create_category(&self, name: &str) -> Result<Category> {
        self.create(CATEGORIES, &CategoryInput::new(name)).await
    }

    pub async fn update_category(&self, id: i64, name: &str) -> Result<Category> {
        self.update(CATEGORIES, id, &CategoryInput::new(name)).await
    }

    /// Fails with a server error while expenses still reference the category.
    pub async fn delete_category(&self, id: i64) -> Result<()> {
        self.remove(CATEGORIES, id).await
    }

    // ===== Expenses =====

    pub async fn list_expenses(&self) -> Result<Vec<Expense>> {
        self.list(EXPENSES).await
    }

    pub async fn create_expense(&self, expense: &NewExpense) -> Result<Expense> {
        self.create(EXPENSES, expense).await
    }

    pub async fn update_expense(&self, id: i64, expense: &NewExpense) -> Result<Expense> {
        self.update(EXPENSES, id, expense).await
    }

    pub async fn delete_expense(&self, id: i64) -> Result<()> {
        self.remove(EXPENSES, id).await
    }

    // ===== Incomes =====

    pub async fn list_incomes(&self) -> Result<Vec<Income>> {
        self.list(INCOMES).await
    }

    pub async fn create_income(&self, income: &NewIncome) -> Result<Income> {
        self.create(INCOMES, income).await
    }

    pub async fn update_income(&self, id: i64, income: &NewIncome) -> Result<Income> {
        self.update(INCOMES, id, income).await
    }

    pub async fn delete_income(&self, id: i64) -> Result<()> {
        self.remove(INCOMES, id).await
    }

    // ===== Transfers =====

    pub async fn list_transfers(&self) -> Result<Vec<Transfer>> {
        self.list(TRANSFERS).await
    }

    pub async fn create_transfer(&self, transfer: &NewTransfer) -> Result<Transfer> {
        self.create(TRANSFERS, transfer).await
    }

    pub async fn update_transfer(&self, id: i64, transfer: &NewTransfer) -> Result<Transfer> {
        self.update(TRANSFERS, id, transfer).await
    }

    pub async fn delete_transfer(&self, id: i64) -> Result<()> {
        self.remove(TRANSFERS, id).await
    }

    // ===== Dashboard =====

    pub async fn summary(&self) -> Result<Summary> {
        self.get(SUMMARY_PATH, Vec::new()).await
    }

    pub async fn monthly_cashflow(&self, filter: &ReportFilter) -> Result<Vec<CashflowMonth>> {
        self.get(MONTHLY_CASHFLOW_PATH, filter.to_query()).await
    }

    pub async fn totals_by_category(&self, filter: &ReportFilter) -> Result<Vec<CategoryTotal>> {
        self.get(TOTALS_BY_CATEGORY_PATH, filter.to_query()).await
    }

    /// Latest expenses, incomes and transfers combined, newest first.
    pub async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityEntry>> {
        let (expenses, incomes, transfers) = futures::try_join!(
            self.list_expenses(),
            self.list_incomes(),
            self.list_transfers(),
        )?;
        Ok(merge_recent(expenses, incomes, transfers, limit))
    }
}

fn item_path(collection: &str, id: i64) -> String {
    format!("{}{}/", collection, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::gateway::REFRESH_PATH;
    use crate::api::testing::{json_response, status_response, ScriptedTransport};
    use crate::api::{ApiError, ApiResponse};
    use crate::auth::{CredentialKey, MemoryStore};
    use chrono::NaiveDate;
    use reqwest::{Method, StatusCode};
    use rust_decimal::Decimal;
    use serde_json::json;

    fn client(transport: Arc<ScriptedTransport>, store: Arc<MemoryStore>) -> ApiClient {
        ApiClient::with_transport(transport, store)
    }

    /// Login endpoint accepting only asha/secret.
    fn auth_backend() -> ScriptedTransport {
        ScriptedTransport::new(|req| {
            let body = req.body.clone().unwrap_or_default();
            let valid = body["username"] == "asha" && body["password"] == "secret";
            match req.path.as_str() {
                LOGIN_PATH | REGISTER_PATH if valid => {
                    Ok(json_response(json!({ "access": "access-1", "refresh": "refresh-1" })))
                }
                LOGIN_PATH => Ok(ApiResponse::new(
                    StatusCode::UNAUTHORIZED,
                    r#"{"detail":"No active account found with the given credentials"}"#,
                )),
                _ => Ok(status_response(StatusCode::BAD_REQUEST)),
            }
        })
    }

    #[test]
    fn test_item_path() {
        assert_eq!(item_path(ACCOUNTS, 3), "accounts/3/");
        assert_eq!(item_path(TRANSFERS, 10), "transfers/10/");
    }

    #[tokio::test]
    async fn test_login_stores_both_tokens() {
        let store = Arc::new(MemoryStore::new());
        let api = client(Arc::new(auth_backend()), store.clone());

        api.login("asha", "secret").await.unwrap();

        assert!(api.session().is_authenticated());
        assert_eq!(store.get(CredentialKey::Access).unwrap().as_deref(), Some("access-1"));
        assert_eq!(store.get(CredentialKey::Refresh).unwrap().as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_invalid_login_stores_nothing() {
        let transport = Arc::new(auth_backend());
        let store = Arc::new(MemoryStore::new());
        let api = client(transport.clone(), store.clone());

        let err = api.login("asha", "wrong").await.unwrap_err();

        let api_err = err.downcast_ref::<ApiError>().unwrap();
        assert!(api_err.is_unauthorized());
        assert!(!api.session().is_authenticated());
        assert_eq!(store.get(CredentialKey::Refresh).unwrap(), None);
        assert_eq!(transport.count_path(REFRESH_PATH), 0);
    }

    #[tokio::test]
    async fn test_login_is_sent_without_stale_token() {
        let transport = Arc::new(auth_backend());
        let api = client(transport.clone(), Arc::new(MemoryStore::with_tokens("old", "old-r")));

        api.login("asha", "secret").await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent[0].bearer_token(), None);
        assert_eq!(api.session().access_token().as_deref(), Some("access-1"));
    }

    #[tokio::test]
    async fn test_register_stores_tokens() {
        let store = Arc::new(MemoryStore::new());
        let api = client(Arc::new(auth_backend()), store.clone());

        api.register("asha", "secret").await.unwrap();
        assert!(api.session().is_authenticated());

        let err = api.register("taken", "pw").await.unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_logout_clears_regardless_of_state() {
        let store = Arc::new(MemoryStore::with_tokens("a", "r"));
        let api = client(Arc::new(auth_backend()), store.clone());

        api.logout();
        assert_eq!(store.get(CredentialKey::Access).unwrap(), None);
        assert_eq!(store.get(CredentialKey::Refresh).unwrap(), None);

        api.logout();
        assert!(!api.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_create_expense_posts_body() {
        let transport = Arc::new(ScriptedTransport::new(|req| {
            let mut created = req.body.clone().unwrap();
            created["id"] = json!(41);
            Ok(json_response(created))
        }));
        let api = client(transport.clone(), Arc::new(MemoryStore::with_tokens("a", "r")));

        let expense = api
            .create_expense(&NewExpense {
                amount: Decimal::new(24999, 2),
                category: 2,
                account: 1,
                description: "Groceries".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(expense.id, 41);
        assert_eq!(expense.amount, Decimal::new(24999, 2));
        let sent = transport.requests();
        assert_eq!(sent[0].method, Method::POST);
        assert_eq!(sent[0].path, "expenses/");
        assert_eq!(sent[0].body.as_ref().unwrap()["amount"], "249.99");
    }

    #[tokio::test]
    async fn test_update_and_delete_use_item_paths() {
        let transport = Arc::new(ScriptedTransport::new(|req| {
            if req.method == Method::DELETE {
                Ok(status_response(StatusCode::NO_CONTENT))
            } else {
                Ok(json_response(json!({ "id": 5, "name": "Wallet", "balance": "0.00" })))
            }
        }));
        let api = client(transport.clone(), Arc::new(MemoryStore::with_tokens("a", "r")));

        let account = api.update_account(5, "Wallet").await.unwrap();
        assert_eq!(account.name, "Wallet");
        api.delete_account(5).await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent[0].method, Method::PUT);
        assert_eq!(sent[0].path, "accounts/5/");
        assert_eq!(sent[0].body, Some(json!({ "name": "Wallet" })));
        assert_eq!(sent[1].method, Method::DELETE);
        assert_eq!(sent[1].path, "accounts/5/");
    }

    #[tokio::test]
    async fn test_delete_referenced_category_surfaces_server_error() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(ApiResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "ProtectedError"))
        }));
        let api = client(transport, Arc::new(MemoryStore::with_tokens("a", "r")));

        let err = api.delete_category(2).await.unwrap_err();
        assert!(err.downcast_ref::<ApiError>().unwrap().is_server_error());
    }

    #[tokio::test]
    async fn test_report_filters_become_query() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(json_response(json!([{ "category": "Food", "total": "820.50" }])))
        }));
        let api = client(transport.clone(), Arc::new(MemoryStore::with_tokens("a", "r")));

        let filter = ReportFilter {
            start: NaiveDate::from_ymd_opt(2025, 1, 1),
            end: NaiveDate::from_ymd_opt(2025, 3, 31),
            account: None,
        };
        let totals = api.totals_by_category(&filter).await.unwrap();
        assert_eq!(totals[0].category, "Food");

        let sent = transport.requests();
        assert_eq!(sent[0].path, "expenses/totals_by_category/");
        assert_eq!(
            sent[0].query,
            vec![
                ("start".to_string(), "2025-01-01".to_string()),
                ("end".to_string(), "2025-03-31".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_monthly_cashflow_without_filter() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(json_response(json!([
                { "month": "2025-02-01", "income": "1000", "expense": "400", "net": "600" }
            ])))
        }));
        let api = client(transport.clone(), Arc::new(MemoryStore::with_tokens("a", "r")));

        let rows = api.monthly_cashflow(&ReportFilter::default()).await.unwrap();
        assert_eq!(rows[0].label(), "2025-02");
        assert!(transport.requests()[0].query.is_empty());
    }

    #[tokio::test]
    async fn test_recent_activity_merges_three_lists() {
        let transport = Arc::new(ScriptedTransport::new(|req| {
            let body = match req.path.as_str() {
                EXPENSES => json!([
                    { "id": 1, "amount": "10", "category": 1, "account": 1, "created_at": "2025-03-01T10:00:00Z" }
                ]),
                INCOMES => json!([
                    { "id": 2, "amount": "500", "account": 1, "created_at": "2025-03-03T10:00:00Z" }
                ]),
                TRANSFERS => json!([
                    { "id": 3, "from_account": 1, "to_account": 2, "amount": "50", "created_at": "2025-03-02T10:00:00Z" }
                ]),
                _ => json!([]),
            };
            Ok(json_response(body))
        }));
        let api = client(transport, Arc::new(MemoryStore::with_tokens("a", "r")));

        let recent = api.recent_activity(2).await.unwrap();
        let ids: Vec<i64> = recent.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_expired_access_is_renewed_transparently() {
        let transport = Arc::new(ScriptedTransport::new(|req| {
            if req.path == REFRESH_PATH {
                return Ok(json_response(json!({ "access": "fresh" })));
            }
            if req.bearer_token() == Some("fresh") {
                Ok(json_response(json!([{ "id": 1, "name": "Food" }])))
            } else {
                Ok(status_response(StatusCode::UNAUTHORIZED))
            }
        }));
        let store = Arc::new(MemoryStore::with_tokens("expired", "r1"));
        let api = client(transport.clone(), store.clone());

        let categories = api.list_categories().await.unwrap();

        assert_eq!(categories[0].name, "Food");
        assert_eq!(transport.count_path(REFRESH_PATH), 1);
        assert_eq!(store.get(CredentialKey::Access).unwrap().as_deref(), Some("fresh"));
    }
}
