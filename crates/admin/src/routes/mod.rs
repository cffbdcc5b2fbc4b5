//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Health check
//!
//! # Panel
//! GET  /                           - Login page or main panel (?q= filters)
//! POST /confirm                    - Answer the pending confirmation
//! GET  /api/busy                   - Busy indicator state
//!
//! # Auth
//! POST /login                      - Log in with username and password
//! POST /logout                     - Log out
//!
//! # Records
//! POST /records                    - Add a customer
//! GET  /records/search             - Debounced keystroke search (rows fragment)
//! POST /records/reload             - Reload from the backend
//! POST /records/toggle             - Show/hide the table
//! POST /records/edit/cancel        - Close the edit form
//! GET  /records/{key}/edit         - Open the edit form
//! POST /records/{key}              - Save the edit form
//! POST /records/{key}/delete       - Ask to delete a customer
//!
//! # Import
//! POST /import                     - Upload and import a spreadsheet
//! POST /import/reset               - Close the import control
//!
//! # Users (admin only)
//! POST /users                      - Create an account
//! POST /users/{user}               - Change password and/or role
//! POST /users/{user}/delete        - Ask to delete an account
//! ```
//!
//! Every mutating handler answers with a redirect to `/`, which renders the
//! outcome from the session's panel state.

pub mod auth;
pub mod import;
pub mod panel;
pub mod records;
pub mod users;

use std::path::PathBuf;

use axum::{Router, extract::DefaultBodyLimit, routing::get, routing::post};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::create_session_layer;
use crate::state::AppState;

/// Largest spreadsheet accepted by `/import`.
const MAX_IMPORT_BYTES: usize = 10 * 1024 * 1024;

/// Build the panel routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(panel::index))
        .route("/confirm", post(panel::confirm))
        .route("/api/busy", get(panel::busy))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/records", post(records::create))
        .route("/records/search", get(records::search))
        .route("/records/reload", post(records::reload))
        .route("/records/toggle", post(records::toggle))
        .route("/records/edit/cancel", post(records::cancel_edit))
        .route("/records/{key}/edit", get(records::edit))
        .route("/records/{key}", post(records::update))
        .route("/records/{key}/delete", post(records::request_delete))
        .route(
            "/import",
            post(import::submit).layer(DefaultBodyLimit::max(MAX_IMPORT_BYTES)),
        )
        .route("/import/reset", post(import::reset))
        .route("/users", post(users::create))
        .route("/users/{user}", post(users::update))
        .route("/users/{user}/delete", post(users::request_delete))
}

/// Build the complete application: routes, static files, sessions, tracing
/// and Sentry.
pub fn app(state: AppState) -> Router {
    let static_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static");
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
