//! Application user accounts (admin only).

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

use roster_core::{Role, UserRef, Username};

use super::{Confirmation, Outcome, report_failure, require_token};
use crate::backend::{Backend, BackendError, NewUserAccount, UserAccountPatch};
use crate::models::{AccessToken, PanelState, PendingAction};
use crate::ui::BusyIndicator;

/// Shown to non-admins who reach an account operation.
pub const ADMIN_ONLY: &str = "Only admins can manage user accounts.";

/// Lists, creates, updates and deletes accounts.
pub struct UserAdmin<'a, B> {
    backend: &'a B,
    busy: &'a BusyIndicator,
}

impl<'a, B: Backend> UserAdmin<'a, B> {
    #[must_use]
    pub const fn new(backend: &'a B, busy: &'a BusyIndicator) -> Self {
        Self { backend, busy }
    }

    /// Bearer token of an admin session, or a forbidden notice.
    fn admin_token(state: &mut PanelState) -> Option<AccessToken> {
        if state.is_authenticated() && !state.is_admin() {
            warn!("Non-admin session tried to manage accounts");
            state.notify_error(ADMIN_ONLY);
            return None;
        }
        require_token(state)
    }

    /// Fetch all accounts.
    #[instrument(skip_all)]
    pub async fn list(&self, state: &mut PanelState) -> Outcome {
        let Some(token) = Self::admin_token(state) else {
            return Outcome::Failed;
        };

        let _busy = self.busy.begin();
        match self.backend.list_users(&token).await {
            Ok(users) => {
                info!(count = users.len(), "Loaded accounts");
                state.users = users;
                Outcome::Completed
            }
            Err(e) => {
                report_failure(state, "Could not load user accounts", &e);
                Outcome::Failed
            }
        }
    }

    /// Create an account, then reload the list.
    ///
    /// Errors go to `user_form_error`: field errors are joined into one line,
    /// anything else is shown as the backend sent it.
    #[instrument(skip(self, state, password))]
    pub async fn create(
        &self,
        state: &mut PanelState,
        username: &str,
        password: SecretString,
        role: Role,
    ) -> Outcome {
        state.user_form_error = None;
        let Some(token) = Self::admin_token(state) else {
            return Outcome::Failed;
        };

        let username = match Username::parse(username) {
            Ok(username) => username,
            Err(e) => {
                state.user_form_error = Some(format!("username: {e}"));
                return Outcome::Failed;
            }
        };
        if password.expose_secret().is_empty() {
            state.user_form_error = Some("password: required".to_string());
            return Outcome::Failed;
        }

        let account = NewUserAccount {
            username,
            password,
            role,
        };

        {
            let _busy = self.busy.begin();
            if let Err(e) = self.backend.create_user(&token, &account).await {
                warn!(error = %e, "Account creation failed");
                match e {
                    BackendError::Unauthorized(_) => {
                        report_failure(state, "Could not create account", &e);
                    }
                    BackendError::Validation(errors) => {
                        state.user_form_error = Some(errors.to_string());
                    }
                    BackendError::Forbidden(message) | BackendError::Api { message, .. } => {
                        state.user_form_error = Some(message);
                    }
                    other => state.user_form_error = Some(other.to_string()),
                }
                return Outcome::Failed;
            }
        }

        self.list(state).await;
        if state.notice.is_none() {
            state.notify(format!("Created account {}.", account.username));
        }
        Outcome::Completed
    }

    /// Change an account's password and/or role, then reload the list.
    #[instrument(skip(self, state, patch))]
    pub async fn update(
        &self,
        state: &mut PanelState,
        user: &UserRef,
        patch: UserAccountPatch,
    ) -> Outcome {
        let Some(token) = Self::admin_token(state) else {
            return Outcome::Failed;
        };
        if patch.is_empty() {
            state.notify("Nothing to update.");
            return Outcome::Completed;
        }

        {
            let _busy = self.busy.begin();
            if let Err(e) = self.backend.update_user(&token, user, &patch).await {
                report_failure(state, "Could not update account", &e);
                return Outcome::Failed;
            }
        }

        self.list(state).await;
        if state.notice.is_none() {
            state.notify(format!("Updated account {}.", label(state, user)));
        }
        Outcome::Completed
    }

    /// Queue an account delete for confirmation.
    pub fn request_delete(state: &mut PanelState, user: UserRef) -> Outcome {
        if Self::admin_token(state).is_none() {
            return Outcome::Failed;
        }
        let label = label(state, &user);
        state.pending = Some(PendingAction::DeleteUser { user, label });
        Outcome::Completed
    }

    /// Delete an account once confirmed, then reload the list.
    #[instrument(skip(self, state))]
    pub async fn delete(
        &self,
        state: &mut PanelState,
        user: &UserRef,
        confirmation: Confirmation,
    ) -> Outcome {
        if confirmation == Confirmation::Declined {
            return Outcome::Declined;
        }
        let Some(token) = Self::admin_token(state) else {
            return Outcome::Failed;
        };

        let label = label(state, user);
        {
            let _busy = self.busy.begin();
            if let Err(e) = self.backend.delete_user(&token, user).await {
                report_failure(state, "Could not delete account", &e);
                return Outcome::Failed;
            }
        }

        self.list(state).await;
        if state.notice.is_none() {
            state.notify(format!("Deleted account {label}."));
        }
        Outcome::Completed
    }
}

/// Username of a listed account, or the reference itself.
fn label(state: &PanelState, user: &UserRef) -> String {
    state
        .users
        .iter()
        .find(|account| &account.reference() == user)
        .map_or_else(|| user.to_string(), |account| account.username.clone())
}
