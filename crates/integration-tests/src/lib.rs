//! Integration test harness for the Roster admin panel.
//!
//! Starts an in-process mock of the records/users backend and, on top of
//! it, the real panel router. Both listen on ephemeral ports, so tests run
//! in parallel without any external service.
//!
//! # Mock backend
//!
//! ```text
//! admin / admin123   role admin, account id 1
//! maria / senha      role user,  account id 2
//! ```
//!
//! Records are kept positionally, like a spreadsheet: rows carry no `id`.
//! Only admins may delete records or touch accounts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use url::Url;

use roster_admin::config::{AdminConfig, BackendConfig};
use roster_admin::controllers::UpdateStrategy;
use roster_admin::state::AppState;

#[derive(Debug, Clone)]
struct Account {
    id: i64,
    username: String,
    password: String,
    role: String,
}

#[derive(Debug, Default)]
struct MockState {
    accounts: Vec<Account>,
    next_account_id: i64,
    records: Vec<Value>,
    tokens: HashMap<String, String>,
    requests: Vec<String>,
}

type Shared = Arc<Mutex<MockState>>;

fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process records/users backend.
pub struct MockBackend {
    pub url: Url,
    state: Shared,
}

impl MockBackend {
    /// Start the mock on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockState {
            accounts: vec![
                Account {
                    id: 1,
                    username: "admin".to_string(),
                    password: "admin123".to_string(),
                    role: "admin".to_string(),
                },
                Account {
                    id: 2,
                    username: "maria".to_string(),
                    password: "senha".to_string(),
                    role: "user".to_string(),
                },
            ],
            next_account_id: 3,
            ..MockState::default()
        }));

        let app = Router::new()
            .route("/login", post(login))
            .route("/logout", post(logout))
            .route("/records", get(list_records).post(create_record))
            .route("/records/{index}", patch(update_record).delete(delete_record))
            .route("/usuarios", get(list_users).post(create_user))
            .route("/usuarios/{id}", patch(update_user).delete(delete_user))
            .with_state(Arc::clone(&state));

        let url = serve(app).await;
        Self { url, state }
    }

    /// Replace the record collection.
    pub fn seed_records(&self, records: Vec<Value>) {
        lock(&self.state).records = records;
    }

    /// Current record collection.
    #[must_use]
    pub fn records(&self) -> Vec<Value> {
        lock(&self.state).records.clone()
    }

    /// Usernames of all accounts.
    #[must_use]
    pub fn usernames(&self) -> Vec<String> {
        lock(&self.state)
            .accounts
            .iter()
            .map(|a| a.username.clone())
            .collect()
    }

    /// Role of an account, if it exists.
    #[must_use]
    pub fn role_of(&self, username: &str) -> Option<String> {
        lock(&self.state)
            .accounts
            .iter()
            .find(|a| a.username == username)
            .map(|a| a.role.clone())
    }

    /// Invalidate every issued token, as if they had expired.
    pub fn expire_tokens(&self) {
        lock(&self.state).tokens.clear();
    }

    /// Requests received so far, as `"METHOD /path"`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        lock(&self.state).requests.clone()
    }

    /// Backend settings pointing at this mock.
    #[must_use]
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.url.clone(),
            records_path: "/records".to_string(),
            users_path: "/usuarios".to_string(),
        }
    }
}

/// Start the admin panel against `backend` and return its base URL.
///
/// # Panics
///
/// Panics if the panel state cannot be built or no local port can be bound.
pub async fn start_panel(backend: &MockBackend, update_strategy: UpdateStrategy) -> Url {
    start_panel_with_debounce(backend, update_strategy, Duration::from_millis(20)).await
}

/// Start the admin panel with a custom keystroke-search quiet window.
///
/// # Panics
///
/// Panics if the panel cannot be started.
pub async fn start_panel_with_debounce(
    backend: &MockBackend,
    update_strategy: UpdateStrategy,
    search_debounce: Duration,
) -> Url {
    let config = AdminConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        backend: backend.backend_config(),
        update_strategy,
        search_debounce,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 1.0,
    };
    let state = AppState::new(config).expect("Failed to create application state");
    serve(roster_admin::routes::app(state)).await
}

/// Browser-like client: keeps cookies and follows redirects.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

async fn serve(app: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to address");
    let addr = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Url::parse(&format!("http://{addr}")).expect("Invalid server URL")
}

// =============================================================================
// Mock handlers
// =============================================================================

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

/// Role of the bearer token's account, or the 401 to answer with.
fn authorize(state: &mut MockState, headers: &HeaderMap, request: String) -> Result<String, Response> {
    state.requests.push(request);
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();
    let Some(username) = state.tokens.get(token).cloned() else {
        return Err(message(StatusCode::UNAUTHORIZED, "Token expirado"));
    };
    state
        .accounts
        .iter()
        .find(|a| a.username == username)
        .map(|a| a.role.clone())
        .ok_or_else(|| message(StatusCode::UNAUTHORIZED, "Token inválido"))
}

fn require_admin(role: &str) -> Result<(), Response> {
    if role == "admin" {
        Ok(())
    } else {
        Err(message(StatusCode::FORBIDDEN, "Acesso negado"))
    }
}

#[derive(Deserialize)]
struct Credentials {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<Credentials>) -> Response {
    let mut state = lock(&state);
    state.requests.push("POST /login".to_string());
    let Some(account) = state
        .accounts
        .iter()
        .find(|a| a.username == body.username && a.password == body.password)
        .cloned()
    else {
        return message(StatusCode::UNAUTHORIZED, "Credenciais inválidas");
    };
    let token = format!("token-{}-{}", account.username, state.tokens.len());
    state.tokens.insert(token.clone(), account.username);
    Json(json!({ "role": account.role, "token": token })).into_response()
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authorize(&mut state, &headers, "POST /logout".to_string()) {
        return response;
    }
    Json(json!({})).into_response()
}

async fn list_records(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authorize(&mut state, &headers, "GET /records".to_string()) {
        return response;
    }
    Json(state.records.clone()).into_response()
}

async fn create_record(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(record): Json<Map<String, Value>>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authorize(&mut state, &headers, "POST /records".to_string()) {
        return response;
    }
    if record.get("Nome Completo").and_then(Value::as_str) == Some("FAIL") {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "Falha ao gravar");
    }
    state.records.push(Value::Object(record));
    (StatusCode::CREATED, Json(json!({ "message": "ok" }))).into_response()
}

async fn update_record(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(index): Path<usize>,
    Json(changes): Json<Map<String, Value>>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authorize(&mut state, &headers, format!("PATCH /records/{index}")) {
        return response;
    }
    let Some(Value::Object(record)) = state.records.get_mut(index) else {
        return message(StatusCode::NOT_FOUND, "Registro não encontrado");
    };
    record.extend(changes);
    Json(json!({ "message": "ok" })).into_response()
}

async fn delete_record(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(index): Path<usize>,
) -> Response {
    let mut state = lock(&state);
    let role = match authorize(&mut state, &headers, format!("DELETE /records/{index}")) {
        Ok(role) => role,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&role) {
        return response;
    }
    if index >= state.records.len() {
        return message(StatusCode::NOT_FOUND, "Registro não encontrado");
    }
    state.records.remove(index);
    Json(json!({ "message": "ok" })).into_response()
}

async fn list_users(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    let role = match authorize(&mut state, &headers, "GET /usuarios".to_string()) {
        Ok(role) => role,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&role) {
        return response;
    }
    let accounts: Vec<Value> = state
        .accounts
        .iter()
        .map(|a| json!({ "id": a.id, "username": a.username, "role": a.role }))
        .collect();
    Json(accounts).into_response()
}

#[derive(Deserialize)]
struct NewAccount {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    role: Option<String>,
}

async fn create_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<NewAccount>,
) -> Response {
    let mut state = lock(&state);
    let role = match authorize(&mut state, &headers, "POST /usuarios".to_string()) {
        Ok(role) => role,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&role) {
        return response;
    }
    if body.username.is_empty() || body.password.is_empty() {
        return message(StatusCode::BAD_REQUEST, "Dados incompletos");
    }
    if body.username.chars().count() < 3 {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "username": ["too short"] })),
        )
            .into_response();
    }
    if state.accounts.iter().any(|a| a.username == body.username) {
        return message(StatusCode::BAD_REQUEST, "Usuário já existe");
    }
    let id = state.next_account_id;
    state.next_account_id += 1;
    state.accounts.push(Account {
        id,
        username: body.username,
        password: body.password,
        role: body.role.unwrap_or_else(|| "user".to_string()),
    });
    (StatusCode::CREATED, Json(json!({ "message": "ok" }))).into_response()
}

#[derive(Deserialize)]
struct AccountChanges {
    password: Option<String>,
    role: Option<String>,
}

async fn update_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(changes): Json<AccountChanges>,
) -> Response {
    let mut state = lock(&state);
    let role = match authorize(&mut state, &headers, format!("PATCH /usuarios/{id}")) {
        Ok(role) => role,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&role) {
        return response;
    }
    let Some(account) = state.accounts.iter_mut().find(|a| a.id == id) else {
        return message(StatusCode::NOT_FOUND, "Usuário não encontrado");
    };
    if let Some(password) = changes.password {
        account.password = password;
    }
    if let Some(role) = changes.role {
        account.role = role;
    }
    Json(json!({ "message": "ok" })).into_response()
}

async fn delete_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = lock(&state);
    let role = match authorize(&mut state, &headers, format!("DELETE /usuarios/{id}")) {
        Ok(role) => role,
        Err(response) => return response,
    };
    if let Err(response) = require_admin(&role) {
        return response;
    }
    let before = state.accounts.len();
    state.accounts.retain(|a| a.id != id);
    if state.accounts.len() == before {
        return message(StatusCode::NOT_FOUND, "Usuário não encontrado");
    }
    Json(json!({ "message": "ok" })).into_response()
}
