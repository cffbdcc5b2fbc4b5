//! UI helpers shared by the controllers and both front ends.

mod busy;
mod debounce;

pub use busy::{BusyGuard, BusyIndicator};
pub use debounce::Debouncer;

use serde::{Deserialize, Serialize};

/// A message shown inline at the top of the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", content = "message", rename_all = "snake_case")]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    /// The message text.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Info(message) | Self::Error(message) => message,
        }
    }

    /// Returns `true` for error notices.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
