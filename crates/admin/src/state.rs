//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::backend::{BackendError, HttpBackend};
use crate::config::AdminConfig;
use crate::controllers::{BulkImport, RecordTable, SessionManager, UpdateStrategy, UserAdmin};
use crate::ui::{BusyIndicator, Debouncer};

/// Debouncers of sessions idle for this long are dropped.
const DEBOUNCER_IDLE: Duration = Duration::from_secs(30 * 60);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: HttpBackend,
    busy: BusyIndicator,
    debouncers: Cache<String, Debouncer>,
}

impl AppState {
    /// Build the state and its backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, BackendError> {
        let backend = HttpBackend::new(&config.backend)?;
        let debouncers = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(DEBOUNCER_IDLE)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                busy: BusyIndicator::new(),
                debouncers,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &HttpBackend {
        &self.inner.backend
    }

    #[must_use]
    pub fn busy(&self) -> &BusyIndicator {
        &self.inner.busy
    }

    #[must_use]
    pub fn update_strategy(&self) -> UpdateStrategy {
        self.inner.config.update_strategy
    }

    /// Keystroke-search debouncer of one browser session.
    pub async fn debouncer(&self, session_key: &str) -> Debouncer {
        let delay = self.inner.config.search_debounce;
        self.inner
            .debouncers
            .get_with(session_key.to_string(), async move { Debouncer::new(delay) })
            .await
    }

    #[must_use]
    pub fn sessions(&self) -> SessionManager<'_, HttpBackend> {
        SessionManager::new(self.backend(), self.busy())
    }

    #[must_use]
    pub fn records(&self) -> RecordTable<'_, HttpBackend> {
        RecordTable::new(self.backend(), self.busy()).with_strategy(self.update_strategy())
    }

    #[must_use]
    pub fn import(&self) -> BulkImport<'_, HttpBackend> {
        BulkImport::new(self.backend(), self.busy())
    }

    #[must_use]
    pub fn users(&self) -> UserAdmin<'_, HttpBackend> {
        UserAdmin::new(self.backend(), self.busy())
    }
}
