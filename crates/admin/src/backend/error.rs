//! Backend client errors.

use roster_core::FieldErrors;
use thiserror::Error;

/// Errors that can occur when talking to the records/users backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure (connection refused, reset, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the credentials or token (401).
    #[error("{0}")]
    Unauthorized(String),

    /// The token is valid but lacks permission (403).
    #[error("{0}")]
    Forbidden(String),

    /// The backend returned field-level validation errors.
    #[error("{0}")]
    Validation(FieldErrors),

    /// Any other non-2xx response.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// A 2xx response whose body could not be read.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The configured backend URL cannot carry a path.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl BackendError {
    /// HTTP status of the failed response, if the backend answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::Validation(_) => Some(400),
            Self::Api { status, .. } => Some(*status),
            Self::Http(_) | Self::Parse(_) | Self::InvalidUrl(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_is_user_facing() {
        let err = BackendError::Unauthorized("Credenciais inválidas".to_string());
        assert_eq!(err.to_string(), "Credenciais inválidas");

        let err = BackendError::Api {
            status: 502,
            message: "upstream down".to_string(),
        };
        assert_eq!(err.to_string(), "upstream down (HTTP 502)");
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_validation_display_concatenates_fields() {
        let errors = FieldErrors::from_payload(&json!({"username": ["taken"]}));
        let err = BackendError::Validation(errors.unwrap_or_else(|| unreachable!()));
        assert_eq!(err.to_string(), "username: taken");
        assert_eq!(err.status(), Some(400));
    }
}
