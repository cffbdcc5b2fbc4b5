//! Authentication route handlers for admin.
//!
//! The login form posts the username and password; the panel never stores
//! the password, only the bearer token the backend hands back.

use axum::{
    Form,
    extract::State,
    response::Redirect,
};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use super::panel::refresh;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::Panel;
use crate::state::AppState;

/// Login form fields.
///
/// Implements `Debug` manually to redact the password.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Log in and load the panel data.
///
/// POST /login
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    mut panel: Panel,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AppError> {
    let secret = SecretString::from(form.password);

    if state
        .sessions()
        .login(&mut panel.state, &form.username, &secret)
        .await
        .is_ok()
    {
        // New session ID on privilege change
        panel.session.cycle_id().await?;
        set_sentry_user(form.username.trim());
        refresh(&state, &mut panel.state).await;
    }

    panel.save().await?;
    Ok(Redirect::to("/"))
}

/// Logout and clear session.
///
/// POST /logout
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, mut panel: Panel) -> Result<Redirect, AppError> {
    state.sessions().logout(&mut panel.state).await;
    panel.session.flush().await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}
