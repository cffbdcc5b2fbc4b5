//! Main panel page and the confirmation dialog.

use axum::{
    Form, Json,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::backend::HttpBackend;
use crate::controllers::{Confirmation, RecordTable, SessionManager};
use crate::error::AppError;
use crate::middleware::{Panel, RequireAuth};
use crate::models::{PanelState, PendingAction};
use crate::state::AppState;
use crate::views::{LoginTemplate, NoticeView, PanelTemplate, render};

#[derive(Debug, Deserialize)]
pub struct PanelQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// Render the login page or the panel, whichever the session calls for.
///
/// GET /
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    mut panel: Panel,
    Query(query): Query<PanelQuery>,
) -> Result<Html<String>, AppError> {
    if SessionManager::<HttpBackend>::restore(&mut panel.state) {
        if let Some(q) = &query.q {
            RecordTable::<HttpBackend>::filter(&mut panel.state, q);
        }
        if panel.state.records.loaded_at.is_none() {
            refresh(&state, &mut panel.state).await;
        }
    }

    let page = if panel.state.is_authenticated() {
        render(&PanelTemplate::new(&mut panel.state))?
    } else {
        render(&LoginTemplate {
            login_error: panel.state.login_error.clone(),
            notice: panel.state.take_notice().map(NoticeView::from),
        })?
    };
    panel.save().await?;
    Ok(page)
}

/// Load the table and, for admins, the account list.
pub(crate) async fn refresh(state: &AppState, panel: &mut PanelState) {
    state.records().load(panel).await;
    if panel.is_admin() {
        state.users().list(panel).await;
    }
}

#[derive(Debug, Deserialize)]
pub struct ConfirmForm {
    pub answer: String,
}

/// Answer the pending confirmation and run the action if confirmed.
///
/// POST /confirm
#[instrument(skip_all, fields(answer = %form.answer))]
pub async fn confirm(
    State(state): State<AppState>,
    RequireAuth(mut panel): RequireAuth,
    Form(form): Form<ConfirmForm>,
) -> Result<Redirect, AppError> {
    let confirmation = Confirmation::from(form.answer == "yes");

    match panel.state.pending.take() {
        Some(PendingAction::DeleteRecord { key, .. }) => {
            state
                .records()
                .delete(&mut panel.state, key, confirmation)
                .await;
        }
        Some(PendingAction::DeleteUser { user, .. }) => {
            state
                .users()
                .delete(&mut panel.state, &user, confirmation)
                .await;
        }
        None => {}
    }

    panel.save().await?;
    Ok(Redirect::to("/"))
}

#[derive(Debug, Serialize)]
pub struct BusyStatus {
    pub busy: bool,
}

/// Whether a backend call is in flight.
///
/// GET /api/busy
pub async fn busy(State(state): State<AppState>, RequireAuth(_): RequireAuth) -> impl IntoResponse {
    Json(BusyStatus {
        busy: state.busy().is_busy(),
    })
}
