//! Customer table.

use std::str::FromStr;

use thiserror::Error;
use tracing::{error, info, instrument};

use roster_core::{CustomerRecord, RecordKey, RecordPatch};

use super::{Confirmation, Outcome, report_failure, require_token};
use crate::backend::Backend;
use crate::models::{AccessToken, PanelState, PendingAction};
use crate::ui::BusyIndicator;

/// How an edited record is written back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// One `PATCH` addressed by key.
    #[default]
    Patch,
    /// Delete, then create the merged record.
    ///
    /// For backends without in-place update. Not atomic: if the create
    /// fails after the delete went through, the record is gone. The create
    /// is retried once and never more, so a record can be lost but is never
    /// duplicated.
    Replace,
}

/// Unrecognised `ROSTER_UPDATE_STRATEGY` value.
#[derive(Debug, Error)]
#[error("unknown update strategy `{0}` (expected `patch` or `replace`)")]
pub struct UnknownStrategy(String);

impl FromStr for UpdateStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patch" => Ok(Self::Patch),
            "replace" => Ok(Self::Replace),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

impl std::fmt::Display for UpdateStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Patch => f.write_str("patch"),
            Self::Replace => f.write_str("replace"),
        }
    }
}

/// Loads, filters and edits the customer table.
pub struct RecordTable<'a, B> {
    backend: &'a B,
    busy: &'a BusyIndicator,
    strategy: UpdateStrategy,
}

impl<'a, B: Backend> RecordTable<'a, B> {
    #[must_use]
    pub const fn new(backend: &'a B, busy: &'a BusyIndicator) -> Self {
        Self {
            backend,
            busy,
            strategy: UpdateStrategy::Patch,
        }
    }

    #[must_use]
    pub const fn with_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Fetch the whole collection and replace the cached rows.
    #[instrument(skip_all)]
    pub async fn load(&self, state: &mut PanelState) -> Outcome {
        let Some(token) = require_token(state) else {
            return Outcome::Failed;
        };

        let _busy = self.busy.begin();
        match self.backend.list_records(&token).await {
            Ok(rows) => {
                info!(count = rows.len(), "Loaded customers");
                state.records.replace(rows);
                Outcome::Completed
            }
            Err(e) => {
                report_failure(state, "Could not load customers", &e);
                Outcome::Failed
            }
        }
    }

    /// Append a customer, then reload.
    #[instrument(skip_all, fields(full_name = %record.full_name))]
    pub async fn create(&self, state: &mut PanelState, record: CustomerRecord) -> Outcome {
        if record.full_name.trim().is_empty() {
            state.notify_error("Full name is required.");
            return Outcome::Failed;
        }
        let Some(token) = require_token(state) else {
            return Outcome::Failed;
        };

        {
            let _busy = self.busy.begin();
            if let Err(e) = self.backend.create_record(&token, &record).await {
                report_failure(state, "Could not add customer", &e);
                return Outcome::Failed;
            }
        }

        self.load(state).await;
        if state.notice.is_none() {
            state.notify(format!("Added {}.", record.full_name));
        }
        Outcome::Completed
    }

    /// Open the edit form for a cached row.
    pub fn begin_edit(state: &mut PanelState, key: RecordKey) -> Outcome {
        if state.records.get(key).is_none() {
            state.notify_error("That customer is no longer in the table. Reload and try again.");
            return Outcome::Failed;
        }
        state.records.editing = Some(key);
        Outcome::Completed
    }

    /// Close the edit form without saving.
    pub fn cancel_edit(state: &mut PanelState) {
        state.records.editing = None;
    }

    /// Write an edited record back, then reload.
    #[instrument(skip(self, state, patch), fields(strategy = %self.strategy))]
    pub async fn update(&self, state: &mut PanelState, key: RecordKey, patch: RecordPatch) -> Outcome {
        if patch.is_empty() {
            state.records.editing = None;
            state.notify("Nothing to update.");
            return Outcome::Completed;
        }
        let Some(token) = require_token(state) else {
            return Outcome::Failed;
        };

        let outcome = match self.strategy {
            UpdateStrategy::Patch => {
                let _busy = self.busy.begin();
                match self.backend.update_record(&token, key, &patch).await {
                    Ok(()) => Outcome::Completed,
                    Err(e) => {
                        report_failure(state, "Could not update customer", &e);
                        return Outcome::Failed;
                    }
                }
            }
            UpdateStrategy::Replace => {
                let Some(current) = state.records.get(key) else {
                    state.notify_error(
                        "That customer is no longer in the table. Reload and try again.",
                    );
                    return Outcome::Failed;
                };
                let merged = patch.merged_onto(&current.record);
                self.replace(state, &token, key, &merged).await
            }
        };

        state.records.editing = None;
        let failure = state.notice.take();
        self.load(state).await;
        if failure.is_some() {
            state.notice = failure;
        } else if state.notice.is_none() {
            state.notify("Customer updated.");
        }
        outcome
    }

    /// Delete-then-create for backends without `PATCH`.
    async fn replace(
        &self,
        state: &mut PanelState,
        token: &AccessToken,
        key: RecordKey,
        merged: &CustomerRecord,
    ) -> Outcome {
        let _busy = self.busy.begin();

        if let Err(e) = self.backend.delete_record(token, key).await {
            report_failure(state, "Could not update customer", &e);
            return Outcome::Failed;
        }

        let first = self.backend.create_record(token, merged).await;
        let Err(first) = first else {
            return Outcome::Completed;
        };
        let Err(second) = self.backend.create_record(token, merged).await else {
            info!(error = %first, "Re-create succeeded on retry");
            return Outcome::Completed;
        };

        error!(
            key = %key,
            first = %first,
            second = %second,
            "Record deleted but not re-created"
        );
        state.notify_error(format!(
            "{} was removed but could not be saved again ({second}). Add it back by hand: \
             Nome Completo = {}, CPF = {}, Numero = {}.",
            merged.full_name, merged.full_name, merged.tax_id, merged.phone_number
        ));
        Outcome::Failed
    }

    /// Queue a delete for confirmation.
    pub fn request_delete(state: &mut PanelState, key: RecordKey) -> Outcome {
        let Some(row) = state.records.get(key) else {
            state.notify_error("That customer is no longer in the table. Reload and try again.");
            return Outcome::Failed;
        };
        state.pending = Some(PendingAction::DeleteRecord {
            key,
            label: row.record.full_name.clone(),
        });
        Outcome::Completed
    }

    /// Delete a customer once confirmed, then reload.
    #[instrument(skip(self, state))]
    pub async fn delete(
        &self,
        state: &mut PanelState,
        key: RecordKey,
        confirmation: Confirmation,
    ) -> Outcome {
        if confirmation == Confirmation::Declined {
            return Outcome::Declined;
        }
        let Some(token) = require_token(state) else {
            return Outcome::Failed;
        };

        {
            let _busy = self.busy.begin();
            if let Err(e) = self.backend.delete_record(&token, key).await {
                report_failure(state, "Could not delete customer", &e);
                return Outcome::Failed;
            }
        }

        if state.records.editing == Some(key) {
            state.records.editing = None;
        }
        self.load(state).await;
        if state.notice.is_none() {
            state.notify("Customer deleted.");
        }
        Outcome::Completed
    }

    /// Set the filter over the loaded rows and return how many match.
    ///
    /// Runs immediately; keystroke-driven callers debounce before calling.
    pub fn filter(state: &mut PanelState, query: &str) -> usize {
        query.trim().clone_into(&mut state.records.filter);
        state.records.visible().count()
    }

    /// Show or hide the table body.
    pub fn toggle_visibility(state: &mut PanelState) -> bool {
        state.records.hidden = !state.records.hidden;
        !state.records.hidden
    }
}
