//! Session-related types for panel authentication.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use roster_core::{Role, Username};

/// Bearer token issued by the backend on login.
///
/// Implements `Debug` manually to redact the token. It is serializable so
/// the server-side session store can hold it; it never reaches the browser.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a token string.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// The logged-in identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelSession {
    /// Login name.
    pub identity: Username,
    /// Permission level, gates the user admin panel.
    pub role: Role,
    /// Credential for backend calls.
    pub token: AccessToken,
}

impl PanelSession {
    /// Returns `true` if the user admin panel is visible.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Session keys for panel data.
pub mod keys {
    /// Key for storing the whole panel state.
    pub const PANEL_STATE: &str = "panel_state";
}
