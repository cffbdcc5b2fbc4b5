//! Authentication extractors for admin.
//!
//! The whole panel state of a browser session is stored under one session
//! key. Handlers take it with [`Panel`] (anyone) or [`RequireAuth`]
//! (logged-in users only), mutate it through the controllers and write it
//! back with [`Panel::save`].

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::{AppError, set_sentry_user};
use crate::models::{PanelState, session_keys};

/// Panel state of the current browser session.
pub struct Panel {
    pub session: Session,
    pub state: PanelState,
}

impl Panel {
    /// Read the panel state stored in `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn load(session: Session) -> Result<Self, AppError> {
        let state = session
            .get::<PanelState>(session_keys::PANEL_STATE)
            .await?
            .unwrap_or_default();
        Ok(Self { session, state })
    }

    /// Write the state back to the session store.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store rejects the write.
    pub async fn save(&self) -> Result<(), AppError> {
        self.session
            .insert(session_keys::PANEL_STATE, &self.state)
            .await?;
        Ok(())
    }

}

impl<S> FromRequestParts<S> for Panel
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Session layer is missing".to_string()))?;

        Self::load(session).await
    }
}

/// Extractor that requires a logged-in panel session.
///
/// If nobody is logged in, returns a redirect to the login page for HTML
/// requests, or 401 Unauthorized for API requests.
pub struct RequireAuth(pub Panel);

/// Error returned when authentication is required but nobody is logged in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// The session store failed.
    Session(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Session(error) => error.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let panel = Panel::from_request_parts(parts, state)
            .await
            .map_err(AuthRejection::Session)?;

        let Some(identity) = panel.state.session.as_ref().map(|s| s.identity.clone()) else {
            let path = parts.uri.path();
            return Err(if path.starts_with("/api/") {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            });
        };

        set_sentry_user(identity.as_str());
        Ok(Self(panel))
    }
}
