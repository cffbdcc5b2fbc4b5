//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_BASE_URL` - Public URL for the admin panel (https enables secure cookies)
//! - `ROSTER_BACKEND_URL` - Base URL of the records/users backend
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ROSTER_RECORDS_PATH` - Record collection path (default: /records)
//! - `ROSTER_USERS_PATH` - User collection path (default: /usuarios)
//! - `ROSTER_UPDATE_STRATEGY` - `patch` or `replace` (default: patch)
//! - `ROSTER_SEARCH_DEBOUNCE_MS` - Keystroke search debounce (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::controllers::UpdateStrategy;

const DEFAULT_RECORDS_PATH: &str = "/records";
const DEFAULT_USERS_PATH: &str = "/usuarios";
const DEFAULT_SEARCH_DEBOUNCE_MS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// Backend connection
    pub backend: BackendConfig,
    /// How edited records are written back
    pub update_strategy: UpdateStrategy,
    /// Quiet window for keystroke-driven search
    pub search_debounce: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Where the records/users backend lives.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL every path is resolved against
    pub base_url: Url,
    /// Record collection path
    pub records_path: String,
    /// User collection path
    pub users_path: String,
}

impl BackendConfig {
    /// Load the backend settings alone (used by the CLI).
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `ROSTER_BACKEND_URL` is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_vars(&env_var)
    }

    fn from_vars(vars: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = get_required(vars, "ROSTER_BACKEND_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("ROSTER_BACKEND_URL".to_string(), e.to_string())
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "ROSTER_BACKEND_URL".to_string(),
                "must be an http(s) URL".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            records_path: collection_path(
                vars,
                "ROSTER_RECORDS_PATH",
                DEFAULT_RECORDS_PATH,
            )?,
            users_path: collection_path(vars, "ROSTER_USERS_PATH", DEFAULT_USERS_PATH)?,
        })
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_vars(&env_var)
    }

    fn from_vars(vars: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = get_or_default(vars, "ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_or_default(vars, "ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = get_required(vars, "ADMIN_BASE_URL")?;
        let backend = BackendConfig::from_vars(vars)?;
        let update_strategy = get_or_default(vars, "ROSTER_UPDATE_STRATEGY", "patch")
            .parse::<UpdateStrategy>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ROSTER_UPDATE_STRATEGY".to_string(), e.to_string())
            })?;
        let search_debounce =
            get_or_default(vars, "ROSTER_SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE_MS)
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "ROSTER_SEARCH_DEBOUNCE_MS".to_string(),
                        e.to_string(),
                    )
                })?;
        let sentry_dsn = vars("SENTRY_DSN");
        let sentry_environment = vars("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = vars("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = vars("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            base_url,
            backend,
            update_strategy,
            search_debounce,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the panel is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Read a variable from the process environment.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get a required variable.
fn get_required(vars: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    vars(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a variable with a default value.
fn get_or_default(vars: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    vars(key).unwrap_or_else(|| default.to_string())
}

/// Get a collection path, normalised to one leading slash and no trailing one.
fn collection_path(
    vars: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<String, ConfigError> {
    let raw = get_or_default(vars, key, default);
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() || trimmed.contains(['?', '#']) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("`{raw}` is not a collection path"),
        ));
    }
    Ok(format!("/{trimmed}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("ADMIN_BASE_URL", "http://localhost:3001"),
        ("ROSTER_BACKEND_URL", "http://localhost:8080"),
    ];

    #[test]
    fn test_defaults() {
        let config = AdminConfig::from_vars(&vars(MINIMAL)).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3001");
        assert_eq!(config.backend.records_path, "/records");
        assert_eq!(config.backend.users_path, "/usuarios");
        assert_eq!(config.update_strategy, UpdateStrategy::Patch);
        assert_eq!(config.search_debounce, Duration::from_millis(300));
        assert!(!config.is_secure());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_backend_url() {
        let result = AdminConfig::from_vars(&vars(&[("ADMIN_BASE_URL", "http://x")]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingEnvVar(key)) if key == "ROSTER_BACKEND_URL"
        ));
    }

    #[test]
    fn test_invalid_strategy() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("ROSTER_UPDATE_STRATEGY", "merge"));
        let result = AdminConfig::from_vars(&vars(&pairs));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "ROSTER_UPDATE_STRATEGY"));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = MINIMAL.to_vec();
        pairs.extend([
            ("ADMIN_PORT", "8000"),
            ("ADMIN_BASE_URL", "https://admin.example.com"),
            ("ROSTER_USERS_PATH", "users/"),
            ("ROSTER_UPDATE_STRATEGY", "replace"),
            ("ROSTER_SEARCH_DEBOUNCE_MS", "50"),
        ]);

        let config = AdminConfig::from_vars(&vars(&pairs)).unwrap();

        assert_eq!(config.port, 8000);
        assert!(config.is_secure());
        assert_eq!(config.backend.users_path, "/users");
        assert_eq!(config.update_strategy, UpdateStrategy::Replace);
        assert_eq!(config.search_debounce, Duration::from_millis(50));
    }

    #[test]
    fn test_collection_path_rejects_empty() {
        let result = collection_path(&vars(&[("P", "/")]), "P", "/records");
        assert!(result.is_err());
    }

    #[test]
    fn test_backend_url_must_be_base() {
        let result = BackendConfig::from_vars(&vars(&[("ROSTER_BACKEND_URL", "mailto:a@b.c")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }
}
