//! Domain models for the panel.

pub mod panel;
pub mod session;

pub use panel::{ImportState, LoadedRecord, PanelState, PendingAction, RecordTableState};
pub use session::{AccessToken, PanelSession, keys as session_keys};
