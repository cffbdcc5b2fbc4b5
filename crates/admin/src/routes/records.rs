//! Customer table route handlers.

use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, instrument};

use roster_core::{CustomerRecord, RecordKey, RecordPatch};

use super::panel::PanelQuery;
use crate::backend::HttpBackend;
use crate::controllers::RecordTable;
use crate::error::{AppError, set_sentry_user};
use crate::middleware::{Panel, RequireAuth};
use crate::state::AppState;
use crate::views::{RecordRowView, RowsTemplate, render};

/// Add and edit form fields.
#[derive(Debug, Default, Deserialize)]
pub struct RecordForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub phone_number: String,
}

impl RecordForm {
    /// Patch carrying only the fields that differ from `current`.
    fn changes_from(self, current: Option<&CustomerRecord>) -> RecordPatch {
        let changed = |new: String, old: Option<&String>| {
            let new = new.trim().to_string();
            (old != Some(&new)).then_some(new)
        };
        RecordPatch {
            full_name: changed(self.full_name, current.map(|r| &r.full_name)),
            tax_id: changed(self.tax_id, current.map(|r| &r.tax_id)),
            phone_number: changed(self.phone_number, current.map(|r| &r.phone_number)),
        }
    }
}

fn parse_key(raw: &str) -> Result<RecordKey, AppError> {
    raw.parse::<RecordKey>().map_err(AppError::BadRequest)
}

/// Add a customer.
///
/// POST /records
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(mut panel): RequireAuth,
    Form(form): Form<RecordForm>,
) -> Result<Redirect, AppError> {
    let record = CustomerRecord::new(
        form.full_name.trim(),
        form.tax_id.trim(),
        form.phone_number.trim(),
    );
    state.records().create(&mut panel.state, record).await;
    panel.save().await?;
    Ok(Redirect::to("/"))
}

/// Keystroke search: filter once typing pauses and return the table body.
///
/// The panel state is read only after the quiet window, so actions that
/// finish while the search is settling are kept. Answers 204 when a later
/// keystroke superseded this one, 401 when nobody is logged in by then.
///
/// GET /records/search?q=
#[instrument(skip_all)]
pub async fn search(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<PanelQuery>,
) -> Result<Response, AppError> {
    if let Some(id) = session.id() {
        let debouncer = state.debouncer(&id.to_string()).await;
        if !debouncer.settle().await {
            debug!("Search superseded by a later keystroke");
            return Ok(StatusCode::NO_CONTENT.into_response());
        }
    }

    let mut panel = Panel::load(session).await?;
    let Some(identity) = panel.state.session.as_ref().map(|s| s.identity.clone()) else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };
    set_sentry_user(identity.as_str());

    let matches = RecordTable::<HttpBackend>::filter(
        &mut panel.state,
        query.q.as_deref().unwrap_or_default(),
    );
    debug!(matches, "Filtered customer table");
    panel.save().await?;

    Ok(render(&RowsTemplate {
        rows: RecordRowView::visible(&panel.state),
    })?
    .into_response())
}

/// Reload the table from the backend.
///
/// POST /records/reload
#[instrument(skip_all)]
pub async fn reload(
    State(state): State<AppState>,
    RequireAuth(mut panel): RequireAuth,
) -> Result<Redirect, AppError> {
    state.records().load(&mut panel.state).await;
    panel.save().await?;
    Ok(Redirect::to("/"))
}

/// Show or hide the table.
///
/// POST /records/toggle
pub async fn toggle(RequireAuth(mut panel): RequireAuth) -> Result<Redirect, AppError> {
    RecordTable::<HttpBackend>::toggle_visibility(&mut panel.state);
    panel.save().await?;
    Ok(Redirect::to("/"))
}

/// Open the edit form for one customer.
///
/// GET /records/{key}/edit
pub async fn edit(
    RequireAuth(mut panel): RequireAuth,
    Path(key): Path<String>,
) -> Result<Redirect, AppError> {
    let key = parse_key(&key)?;
    RecordTable::<HttpBackend>::begin_edit(&mut panel.state, key);
    panel.save().await?;
    Ok(Redirect::to("/"))
}

/// Save the edit form.
///
/// Only fields that changed are sent.
///
/// POST /records/{key}
#[instrument(skip(state, panel, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(mut panel): RequireAuth,
    Path(key): Path<String>,
    Form(form): Form<RecordForm>,
) -> Result<Redirect, AppError> {
    let key = parse_key(&key)?;
    let current = panel.state.records.get(key).map(|row| &row.record);
    let patch = form.changes_from(current);

    state.records().update(&mut panel.state, key, patch).await;
    panel.save().await?;
    Ok(Redirect::to("/"))
}

/// Close the edit form without saving.
///
/// POST /records/edit/cancel
pub async fn cancel_edit(RequireAuth(mut panel): RequireAuth) -> Result<Redirect, AppError> {
    RecordTable::<HttpBackend>::cancel_edit(&mut panel.state);
    panel.save().await?;
    Ok(Redirect::to("/"))
}

/// Ask for confirmation before deleting a customer.
///
/// POST /records/{key}/delete
pub async fn request_delete(
    RequireAuth(mut panel): RequireAuth,
    Path(key): Path<String>,
) -> Result<Redirect, AppError> {
    let key = parse_key(&key)?;
    RecordTable::<HttpBackend>::request_delete(&mut panel.state, key);
    panel.save().await?;
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(full_name: &str, tax_id: &str, phone_number: &str) -> RecordForm {
        RecordForm {
            full_name: full_name.to_string(),
            tax_id: tax_id.to_string(),
            phone_number: phone_number.to_string(),
        }
    }

    #[test]
    fn test_patch_carries_only_changed_fields() {
        let current = CustomerRecord::new("Maria Souza", "222", "555");

        let patch = form("Maria Souza ", "223", "555").changes_from(Some(&current));

        assert_eq!(
            patch,
            RecordPatch {
                tax_id: Some("223".to_string()),
                ..RecordPatch::default()
            }
        );
    }

    #[test]
    fn test_unchanged_form_is_empty_patch() {
        let current = CustomerRecord::new("Ana", "1", "");
        assert!(form("Ana", "1", "").changes_from(Some(&current)).is_empty());
    }

    #[test]
    fn test_unknown_row_sends_every_field() {
        let patch = form("Ana", "1", "2").changes_from(None);
        assert_eq!(patch.full_name.as_deref(), Some("Ana"));
        assert_eq!(patch.phone_number.as_deref(), Some("2"));
    }

    #[test]
    fn test_bad_key_is_bad_request() {
        assert!(matches!(parse_key("abc"), Err(AppError::BadRequest(_))));
        assert_eq!(parse_key("row-2").ok(), Some(RecordKey::Index(2)));
    }
}
