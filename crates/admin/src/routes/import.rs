//! Spreadsheet import route handlers.

use axum::{
    extract::{Multipart, State},
    response::Redirect,
};
use tracing::{info, instrument};

use crate::backend::HttpBackend;
use crate::controllers::BulkImport;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Name of the file input in the import form.
const FILE_FIELD: &str = "file";

/// Take the uploaded workbook and import it.
///
/// POST /import (multipart)
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(mut panel): RequireAuth,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((file_name, bytes));
    }

    match upload {
        Some((file_name, bytes)) if !file_name.is_empty() => {
            info!(file_name, size = bytes.len(), "Received import file");
            if BulkImport::<HttpBackend>::select(&mut panel.state, &file_name, bytes.to_vec())
                .is_completed()
            {
                state.import().submit(&mut panel.state).await;
            }
        }
        _ => panel.state.notify_error("Choose a spreadsheet first."),
    }

    panel.save().await?;
    Ok(Redirect::to("/"))
}

/// Close the import control.
///
/// POST /import/reset
pub async fn reset(RequireAuth(mut panel): RequireAuth) -> Result<Redirect, AppError> {
    BulkImport::<HttpBackend>::reset(&mut panel.state);
    panel.save().await?;
    Ok(Redirect::to("/"))
}
