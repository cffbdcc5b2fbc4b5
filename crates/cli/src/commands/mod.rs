//! Command implementations.
//!
//! Each command logs in, drives the same controllers the web panel uses and
//! turns the panel notice into a log line or an error.

pub mod import;
pub mod records;
pub mod users;

use secrecy::SecretString;
use thiserror::Error;

use roster_admin::backend::{BackendError, HttpBackend};
use roster_admin::config::{BackendConfig, ConfigError};
use roster_admin::controllers::{AuthError, Outcome, SessionManager, UpdateStrategy};
use roster_admin::models::PanelState;
use roster_admin::ui::BusyIndicator;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Backend settings are missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Backend client could not be built.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Login was refused.
    #[error("Login failed: {0}")]
    Auth(#[from] AuthError),

    /// Invalid command argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Import file could not be read.
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The operation ran and reported a failure.
    #[error("{0}")]
    Failed(String),
}

/// A logged-in session plus the panel state the controllers work on.
pub struct Context {
    pub backend: HttpBackend,
    pub busy: BusyIndicator,
    pub strategy: UpdateStrategy,
    pub state: PanelState,
}

impl Context {
    /// Log in with `ROSTER_USERNAME`/`ROSTER_PASSWORD`.
    pub async fn login(username: Option<String>) -> Result<Self, CliError> {
        let config = BackendConfig::from_env()?;
        let username = username
            .or_else(|| env_var("ROSTER_USERNAME"))
            .ok_or(CliError::MissingEnvVar("ROSTER_USERNAME"))?;
        let password = secret_from_env("ROSTER_PASSWORD")?;
        let strategy = env_var("ROSTER_UPDATE_STRATEGY")
            .map(|s| s.parse::<UpdateStrategy>())
            .transpose()
            .map_err(|e| CliError::InvalidArgument(e.to_string()))?
            .unwrap_or_default();

        let mut ctx = Self {
            backend: HttpBackend::new(&config)?,
            busy: BusyIndicator::new(),
            strategy,
            state: PanelState::default(),
        };

        tracing::info!("Logging in to {} as {}", config.base_url, username);
        SessionManager::new(&ctx.backend, &ctx.busy)
            .login(&mut ctx.state, &username, &password)
            .await?;

        Ok(ctx)
    }

    /// End the backend session.
    pub async fn logout(&mut self) {
        SessionManager::new(&self.backend, &self.busy)
            .logout(&mut self.state)
            .await;
    }

    /// Turn the outcome and the queued notice into a result.
    pub fn finish(&mut self, outcome: Outcome) -> Result<(), CliError> {
        let notice = self.state.take_notice();
        match (outcome, notice) {
            (Outcome::Failed, Some(notice)) => Err(CliError::Failed(notice.message().to_string())),
            (Outcome::Failed, None) => Err(CliError::Failed("Operation failed".to_string())),
            (_, Some(notice)) if notice.is_error() => {
                Err(CliError::Failed(notice.message().to_string()))
            }
            (Outcome::Declined, _) => {
                tracing::warn!("Not confirmed, nothing was deleted (pass --yes)");
                Ok(())
            }
            (Outcome::Completed, notice) => {
                if let Some(notice) = notice {
                    tracing::info!("{}", notice.message());
                }
                Ok(())
            }
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Read a secret from the environment.
pub fn secret_from_env(key: &'static str) -> Result<SecretString, CliError> {
    env_var(key)
        .map(SecretString::from)
        .ok_or(CliError::MissingEnvVar(key))
}
