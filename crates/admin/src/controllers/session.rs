//! Login state.

use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, instrument, warn};

use roster_core::{Username, UsernameError};

use crate::backend::{Backend, BackendError};
use crate::models::{AccessToken, PanelSession, PanelState};
use crate::ui::BusyIndicator;

/// Why a login attempt failed.
///
/// The display text is what the login form shows.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The username could not be used at all.
    #[error("Invalid username: {0}")]
    InvalidIdentity(#[from] UsernameError),

    /// The password field was left blank.
    #[error("Password is required")]
    MissingSecret,

    /// The backend rejected the credentials; carries its message.
    #[error("{0}")]
    Rejected(String),

    /// The backend accepted the login but issued no token.
    #[error("The server did not issue an access token")]
    MissingToken,

    /// The backend could not be reached or answered with an error.
    #[error("Login failed: {0}")]
    Backend(BackendError),
}

impl From<BackendError> for AuthError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Unauthorized(message) | BackendError::Forbidden(message) => {
                Self::Rejected(message)
            }
            other => Self::Backend(other),
        }
    }
}

/// Logs users in and out of the panel.
pub struct SessionManager<'a, B> {
    backend: &'a B,
    busy: &'a BusyIndicator,
}

impl<'a, B: Backend> SessionManager<'a, B> {
    #[must_use]
    pub const fn new(backend: &'a B, busy: &'a BusyIndicator) -> Self {
        Self { backend, busy }
    }

    /// Exchange credentials for a session.
    ///
    /// On success the panel state is reset to a fresh session, so nothing
    /// from a previous login survives. On failure the state keeps no session
    /// and `login_error` holds the message for the form.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] that was also written to `login_error`.
    #[instrument(skip(self, state, secret))]
    pub async fn login(
        &self,
        state: &mut PanelState,
        identity: &str,
        secret: &SecretString,
    ) -> Result<(), AuthError> {
        match self.authenticate(identity, secret).await {
            Ok(session) => {
                info!(username = %session.identity, role = %session.role, "Logged in");
                *state = PanelState {
                    session: Some(session),
                    ..PanelState::default()
                };
                Ok(())
            }
            Err(error) => {
                warn!(%error, "Login failed");
                state.session = None;
                state.login_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    async fn authenticate(
        &self,
        identity: &str,
        secret: &SecretString,
    ) -> Result<PanelSession, AuthError> {
        use secrecy::ExposeSecret;

        let identity = Username::parse(identity)?;
        if secret.expose_secret().is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let _busy = self.busy.begin();
        let response = self.backend.login(&identity, secret).await?;
        let token = response
            .token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        Ok(PanelSession {
            identity,
            role: response.role,
            token: AccessToken::new(token),
        })
    }

    /// End the session.
    ///
    /// The backend is told first, but the local state is cleared whatever
    /// it answers.
    #[instrument(skip_all)]
    pub async fn logout(&self, state: &mut PanelState) {
        if let Some(session) = state.session.take() {
            let _busy = self.busy.begin();
            if let Err(error) = self.backend.logout(&session.token).await {
                warn!(%error, "Backend logout failed, clearing local session anyway");
            }
            info!(username = %session.identity, "Logged out");
        }
        *state = PanelState::default();
    }

    /// Whether the main panel should be shown.
    #[must_use]
    pub const fn is_authenticated(state: &PanelState) -> bool {
        state.is_authenticated()
    }

    /// Pick up a session that survived a page reload.
    ///
    /// Returns `true` if the main panel can be shown without logging in. A
    /// stale login error from an earlier attempt is dropped.
    pub fn restore(state: &mut PanelState) -> bool {
        if state.is_authenticated() {
            state.login_error = None;
            true
        } else {
            false
        }
    }
}
