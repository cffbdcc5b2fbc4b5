//! Per-session panel state.
//!
//! Everything the panel remembers between two user actions lives here and is
//! passed explicitly to the controllers: the login, the last loaded rows,
//! the record being edited, the import control, the pending confirmation
//! and the message to show next.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roster_core::{CustomerRecord, RecordKey, UserAccount, UserRef};

use super::session::{AccessToken, PanelSession};
use crate::backend::RecordRow;
use crate::ui::Notice;

/// UI state of one panel session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelState {
    /// Logged-in identity, `None` shows the login form.
    pub session: Option<PanelSession>,
    /// Inline error under the login form.
    pub login_error: Option<String>,
    /// Customer table.
    pub records: RecordTableState,
    /// Spreadsheet import control.
    pub import: ImportState,
    /// Accounts shown in the admin panel.
    pub users: Vec<UserAccount>,
    /// Inline error under the new-account form.
    pub user_form_error: Option<String>,
    /// Destructive action waiting for a yes/no answer.
    pub pending: Option<PendingAction>,
    /// Message to show on the next render.
    pub notice: Option<Notice>,
}

impl PanelState {
    /// Returns `true` once a login succeeded.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Returns `true` if the logged-in user is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session.as_ref().is_some_and(PanelSession::is_admin)
    }

    /// Bearer token of the current session.
    #[must_use]
    pub fn token(&self) -> Option<&AccessToken> {
        self.session.as_ref().map(|s| &s.token)
    }

    /// Queue an informational message.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice::Info(message.into()));
    }

    /// Queue an error message.
    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice::Error(message.into()));
    }

    /// Take the queued message, clearing it.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}

/// A row of the customer table together with its address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedRecord {
    pub key: RecordKey,
    pub record: CustomerRecord,
}

/// Customer table state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordTableState {
    /// Rows from the last load, in backend order.
    pub rows: Vec<LoadedRecord>,
    /// When the rows were loaded; `None` until the first load.
    pub loaded_at: Option<DateTime<Utc>>,
    /// Active filter query.
    pub filter: String,
    /// Record whose edit form is open.
    pub editing: Option<RecordKey>,
    /// Table body collapsed with the show/hide toggle.
    #[serde(default)]
    pub hidden: bool,
}

impl RecordTableState {
    /// Replace the cached rows with a fresh load.
    ///
    /// Rows carrying a backend ID are keyed by it; the others by position.
    pub fn replace(&mut self, rows: Vec<RecordRow>) {
        self.rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| LoadedRecord {
                key: row.id.map_or(RecordKey::Index(index), RecordKey::Id),
                record: row.record,
            })
            .collect();
        self.loaded_at = Some(Utc::now());
        if self.editing.is_some_and(|key| self.get(key).is_none()) {
            self.editing = None;
        }
    }

    /// Look up a cached row by key.
    #[must_use]
    pub fn get(&self, key: RecordKey) -> Option<&LoadedRecord> {
        self.rows.iter().find(|row| row.key == key)
    }

    /// Rows matching the active filter.
    pub fn visible(&self) -> impl Iterator<Item = &LoadedRecord> {
        self.rows
            .iter()
            .filter(|row| row.record.matches(&self.filter))
    }
}

/// Spreadsheet import control.
///
/// `Idle -> FileSelected -> Importing -> Idle`. The file bytes are not
/// persisted with the session; selection and submission happen within one
/// request on the web front end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ImportState {
    #[default]
    Idle,
    FileSelected {
        file_name: String,
        #[serde(skip)]
        bytes: Vec<u8>,
    },
    /// Rows are being written. Lasts for one request only.
    Importing { file_name: String },
}

impl ImportState {
    /// Name of the selected file, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::FileSelected { file_name, .. } | Self::Importing { file_name, .. } => {
                Some(file_name)
            }
        }
    }

    /// Returns `true` if the import button should be enabled.
    #[must_use]
    pub const fn can_submit(&self) -> bool {
        matches!(self, Self::FileSelected { .. })
    }
}

/// A destructive action waiting for confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PendingAction {
    DeleteRecord { key: RecordKey, label: String },
    DeleteUser { user: UserRef, label: String },
}

impl PendingAction {
    /// Question shown in the confirmation dialog.
    #[must_use]
    pub fn prompt(&self) -> String {
        match self {
            Self::DeleteRecord { label, .. } => format!("Delete customer \"{label}\"?"),
            Self::DeleteUser { label, .. } => format!("Delete user account \"{label}\"?"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use roster_core::RecordId;

    fn row(id: Option<i64>, name: &str) -> RecordRow {
        RecordRow {
            id: id.map(RecordId::new),
            record: CustomerRecord::new(name, "", ""),
        }
    }

    #[test]
    fn test_replace_keys_by_id_or_position() {
        let mut table = RecordTableState::default();
        table.replace(vec![row(Some(10), "Ana"), row(None, "Bia")]);

        assert_eq!(table.rows[0].key, RecordKey::Id(RecordId::new(10)));
        assert_eq!(table.rows[1].key, RecordKey::Index(1));
        assert!(table.loaded_at.is_some());
    }

    #[test]
    fn test_replace_closes_edit_of_vanished_row() {
        let mut table = RecordTableState::default();
        table.replace(vec![row(None, "Ana"), row(None, "Bia")]);
        table.editing = Some(RecordKey::Index(1));

        table.replace(vec![row(None, "Ana")]);

        assert_eq!(table.editing, None);
    }

    #[test]
    fn test_visible_applies_filter() {
        let mut table = RecordTableState::default();
        table.replace(vec![row(None, "João Silva"), row(None, "Maria Souza")]);

        table.filter = "joão".to_string();
        let names: Vec<_> = table.visible().map(|r| r.record.full_name.as_str()).collect();
        assert_eq!(names, vec!["João Silva"]);

        table.filter.clear();
        assert_eq!(table.visible().count(), 2);
    }

    #[test]
    fn test_import_state_does_not_persist_bytes() {
        let state = ImportState::FileSelected {
            file_name: "clientes.xlsx".to_string(),
            bytes: vec![1, 2, 3],
        };
        let restored: ImportState =
            serde_json::from_value(serde_json::to_value(&state).unwrap()).unwrap();

        match restored {
            ImportState::FileSelected { file_name, bytes } => {
                assert_eq!(file_name, "clientes.xlsx");
                assert!(bytes.is_empty());
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_notice_is_taken_once() {
        let mut state = PanelState::default();
        state.notify_error("boom");
        assert_eq!(state.take_notice(), Some(Notice::Error("boom".to_string())));
        assert_eq!(state.take_notice(), None);
    }
}
