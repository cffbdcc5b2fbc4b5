//! Page templates and the view models they render.
//!
//! Views are built from a [`PanelState`] snapshot; they never talk to the
//! backend.

use askama::Template;
use axum::response::Html;

use crate::error::AppError;
use crate::filters;
use crate::models::{LoadedRecord, PanelState};
use crate::ui::Notice;

/// Render a template into an HTML response body.
///
/// # Errors
///
/// Returns [`AppError::Template`] if rendering fails.
pub fn render(template: &impl Template) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

/// A notice ready for display.
#[derive(Debug, Clone)]
pub struct NoticeView {
    pub is_error: bool,
    pub message: String,
}

impl From<Notice> for NoticeView {
    fn from(notice: Notice) -> Self {
        Self {
            is_error: notice.is_error(),
            message: notice.message().to_string(),
        }
    }
}

/// One customer table row.
#[derive(Debug, Clone)]
pub struct RecordRowView {
    pub slug: String,
    pub full_name: String,
    pub tax_id: String,
    pub phone_number: String,
    pub is_editing: bool,
}

impl RecordRowView {
    fn new(row: &LoadedRecord, state: &PanelState) -> Self {
        Self {
            slug: row.key.slug(),
            full_name: row.record.full_name.clone(),
            tax_id: row.record.tax_id.clone(),
            phone_number: row.record.phone_number.clone(),
            is_editing: state.records.editing == Some(row.key),
        }
    }

    /// Rows passing the active filter.
    #[must_use]
    pub fn visible(state: &PanelState) -> Vec<Self> {
        state
            .records
            .visible()
            .map(|row| Self::new(row, state))
            .collect()
    }
}

/// One account in the admin table.
#[derive(Debug, Clone)]
pub struct UserRowView {
    pub reference: String,
    pub username: String,
    pub role: String,
    pub is_admin: bool,
}

/// Login page template.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub login_error: Option<String>,
    pub notice: Option<NoticeView>,
}

/// Customer table body, also served alone for keystroke search.
#[derive(Template)]
#[template(path = "records/rows.html")]
pub struct RowsTemplate {
    pub rows: Vec<RecordRowView>,
}

/// Main panel template.
#[derive(Template)]
#[template(path = "panel.html")]
pub struct PanelTemplate {
    pub identity: String,
    pub role: String,
    pub is_admin: bool,
    pub notice: Option<NoticeView>,
    pub pending_prompt: Option<String>,
    pub filter: String,
    pub hidden: bool,
    pub loaded_at: Option<String>,
    pub total_rows: usize,
    pub positional_keys: bool,
    pub rows: Vec<RecordRowView>,
    pub editing: Option<RecordRowView>,
    pub import_file: Option<String>,
    pub users: Vec<UserRowView>,
    pub user_form_error: Option<String>,
}

impl PanelTemplate {
    /// Build the panel view, consuming the queued notice.
    #[must_use]
    pub fn new(state: &mut PanelState) -> Self {
        let notice = state.take_notice().map(NoticeView::from);
        let (identity, role, is_admin) = state.session.as_ref().map_or_else(
            || (String::new(), String::new(), false),
            |s| (s.identity.to_string(), s.role.to_string(), s.is_admin()),
        );

        let editing = state
            .records
            .editing
            .and_then(|key| state.records.get(key))
            .map(|row| RecordRowView::new(row, state));

        let users = if is_admin {
            state
                .users
                .iter()
                .map(|account| UserRowView {
                    reference: account.reference().to_string(),
                    username: account.username.clone(),
                    role: account.role.to_string(),
                    is_admin: account.role.is_admin(),
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            identity,
            role,
            is_admin,
            notice,
            pending_prompt: state.pending.as_ref().map(|p| p.prompt()),
            filter: state.records.filter.clone(),
            hidden: state.records.hidden,
            loaded_at: state
                .records
                .loaded_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            total_rows: state.records.rows.len(),
            positional_keys: state.records.rows.iter().any(|r| !r.key.is_stable()),
            rows: RecordRowView::visible(state),
            editing,
            import_file: state.import.file_name().map(str::to_string),
            users,
            user_form_error: state.user_form_error.clone(),
        }
    }
}
