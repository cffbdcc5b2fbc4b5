//! Spreadsheet import.
//!
//! `Idle -> FileSelected -> Importing -> Idle`. Rows are written one create
//! call at a time, in sheet order, each awaited before the next. There is no
//! rollback: when a row fails the rows before it stay created.

use tracing::{info, instrument, warn};

use super::{Outcome, RecordTable, report_failure, require_token};
use crate::backend::Backend;
use crate::models::{ImportState, PanelState};
use crate::spreadsheet;
use crate::ui::BusyIndicator;

/// Drives the import control.
pub struct BulkImport<'a, B> {
    backend: &'a B,
    busy: &'a BusyIndicator,
}

impl<'a, B: Backend> BulkImport<'a, B> {
    #[must_use]
    pub const fn new(backend: &'a B, busy: &'a BusyIndicator) -> Self {
        Self { backend, busy }
    }

    /// Pick a file. Anything but `.xlsx`/`.xls` is refused and the control
    /// keeps its current state.
    pub fn select(state: &mut PanelState, file_name: &str, bytes: Vec<u8>) -> Outcome {
        if let Err(e) = spreadsheet::check_extension(file_name) {
            warn!(file_name, "Refused import file");
            state.notify_error(e.to_string());
            return Outcome::Failed;
        }
        state.import = ImportState::FileSelected {
            file_name: file_name.to_string(),
            bytes,
        };
        Outcome::Completed
    }

    /// Import the selected file, then reload the table.
    ///
    /// A file that does not follow the template is refused before any write
    /// and the table is left as it is.
    #[instrument(skip_all, fields(file_name = state.import.file_name().unwrap_or_default()))]
    pub async fn submit(&self, state: &mut PanelState) -> Outcome {
        let ImportState::FileSelected { file_name, bytes } = std::mem::take(&mut state.import)
        else {
            state.notify_error("Choose a spreadsheet first.");
            return Outcome::Failed;
        };

        let records = match spreadsheet::customer_rows(&bytes) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Import file rejected");
                state.notify_error(e.to_string());
                return Outcome::Failed;
            }
        };
        let Some(token) = require_token(state) else {
            return Outcome::Failed;
        };

        let total = records.len();
        state.import = ImportState::Importing {
            file_name: file_name.clone(),
        };

        let mut failed = None;
        {
            let _busy = self.busy.begin();
            for record in &records {
                if let Err(e) = self.backend.create_record(&token, record).await {
                    failed = Some(e);
                    break;
                }
            }
        }

        let outcome = if let Some(e) = &failed {
            report_failure(state, "Import failed", e);
            Outcome::Failed
        } else {
            info!(total, "Import finished");
            Outcome::Completed
        };

        let notice = state.notice.take();
        RecordTable::new(self.backend, self.busy).load(state).await;
        state.import = ImportState::Idle;
        if notice.is_some() {
            state.notice = notice;
        } else if outcome.is_completed() && state.notice.is_none() {
            state.notify(format!("Imported {total} customers from {file_name}."));
        }
        outcome
    }

    /// Close the import control, dropping any selected file.
    pub fn reset(state: &mut PanelState) {
        state.import = ImportState::Idle;
    }
}
