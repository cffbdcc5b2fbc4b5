//! User account route handlers (admin only).
//!
//! Non-admins reaching these get a notice from the controller, never a
//! backend call.

use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use roster_core::{Role, UserRef};

use crate::backend::{HttpBackend, UserAccountPatch};
use crate::controllers::UserAdmin;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::PanelState;
use crate::state::AppState;

/// Account creation form.
///
/// Implements `Debug` manually to redact the password.
#[derive(Deserialize)]
pub struct NewUserForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: String,
}

impl std::fmt::Debug for NewUserForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUserForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Account update form; blank fields are left unchanged.
#[derive(Deserialize, Default)]
pub struct UserUpdateForm {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

impl UserUpdateForm {
    /// Patch with a new password if one was typed and a role if it changed.
    fn into_patch(self, current: Option<Role>) -> Result<UserAccountPatch, String> {
        let role = if self.role.is_empty() {
            None
        } else {
            Some(self.role.parse::<Role>()?).filter(|role| Some(*role) != current)
        };
        let password = (!self.password.is_empty()).then(|| SecretString::from(self.password));
        Ok(UserAccountPatch { password, role })
    }
}

fn current_role(state: &PanelState, user: &UserRef) -> Option<Role> {
    state
        .users
        .iter()
        .find(|account| &account.reference() == user)
        .map(|account| account.role)
}

/// Create an account.
///
/// POST /users
#[instrument(skip_all, fields(username = %form.username))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(mut panel): RequireAuth,
    Form(form): Form<NewUserForm>,
) -> Result<Redirect, AppError> {
    let role = if form.role.is_empty() {
        Ok(Role::User)
    } else {
        form.role.parse::<Role>()
    };

    match role {
        Ok(role) => {
            state
                .users()
                .create(
                    &mut panel.state,
                    &form.username,
                    SecretString::from(form.password),
                    role,
                )
                .await;
        }
        Err(e) => panel.state.user_form_error = Some(format!("role: {e}")),
    }

    panel.save().await?;
    Ok(Redirect::to("/"))
}

/// Change an account's password and/or role.
///
/// POST /users/{user}
#[instrument(skip(state, panel, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(mut panel): RequireAuth,
    Path(user): Path<String>,
    Form(form): Form<UserUpdateForm>,
) -> Result<Redirect, AppError> {
    let Ok(user) = user.parse::<UserRef>();
    let current = current_role(&panel.state, &user);

    match form.into_patch(current) {
        Ok(patch) => {
            state.users().update(&mut panel.state, &user, patch).await;
        }
        Err(e) => panel.state.notify_error(e),
    }

    panel.save().await?;
    Ok(Redirect::to("/"))
}

/// Ask for confirmation before deleting an account.
///
/// POST /users/{user}/delete
pub async fn request_delete(
    RequireAuth(mut panel): RequireAuth,
    Path(user): Path<String>,
) -> Result<Redirect, AppError> {
    let Ok(user) = user.parse::<UserRef>();
    UserAdmin::<HttpBackend>::request_delete(&mut panel.state, user);
    panel.save().await?;
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(password: &str, role: &str) -> UserUpdateForm {
        UserUpdateForm {
            password: password.to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_unchanged_role_is_left_out() {
        let patch = form("", "user").into_patch(Some(Role::User)).ok();
        assert!(patch.is_some_and(|p| p.is_empty()));
    }

    #[test]
    fn test_changed_role_and_password() {
        let patch = form("nova", "admin").into_patch(Some(Role::User)).ok();
        assert!(patch.is_some_and(|p| p.role == Some(Role::Admin) && p.password.is_some()));
    }

    #[test]
    fn test_unknown_role_is_refused() {
        assert!(form("", "root").into_patch(None).is_err());
    }
}
