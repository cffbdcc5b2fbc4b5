//! Spreadsheet import command.

use std::path::Path;

use roster_admin::controllers::BulkImport;

use super::{CliError, Context};

/// Import every row of the first worksheet, in order.
pub async fn run(ctx: &mut Context, file: &Path) -> Result<(), CliError> {
    let bytes = tokio::fs::read(file).await.map_err(|source| CliError::Io {
        path: file.display().to_string(),
        source,
    })?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let import = BulkImport::new(&ctx.backend, &ctx.busy);
    let outcome = if BulkImport::<roster_admin::backend::HttpBackend>::select(
        &mut ctx.state,
        &file_name,
        bytes,
    )
    .is_completed()
    {
        import.submit(&mut ctx.state).await
    } else {
        roster_admin::controllers::Outcome::Failed
    };
    ctx.finish(outcome)
}
