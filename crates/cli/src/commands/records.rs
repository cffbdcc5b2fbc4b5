//! Customer record commands.

use roster_admin::backend::HttpBackend;
use roster_admin::controllers::{Confirmation, Outcome, RecordTable};
use roster_core::{CustomerRecord, RecordKey, RecordPatch};

use super::{CliError, Context};

fn parse_key(key: &str) -> Result<RecordKey, CliError> {
    key.parse::<RecordKey>().map_err(CliError::InvalidArgument)
}

/// Load the table so positional keys line up with what `list` showed.
async fn load(ctx: &mut Context) -> Result<(), CliError> {
    let outcome = RecordTable::new(&ctx.backend, &ctx.busy)
        .load(&mut ctx.state)
        .await;
    if outcome.is_completed() {
        Ok(())
    } else {
        ctx.finish(outcome)
    }
}

/// List customers.
pub async fn list(ctx: &mut Context, filter: Option<&str>) -> Result<(), CliError> {
    load(ctx).await?;
    let shown = RecordTable::<HttpBackend>::filter(&mut ctx.state, filter.unwrap_or_default());

    for row in ctx.state.records.visible() {
        tracing::info!(
            "{:<8} {:<32} {:<14} {}",
            row.key.slug(),
            row.record.full_name,
            row.record.tax_id,
            row.record.phone_number
        );
    }
    tracing::info!("{} of {} customers", shown, ctx.state.records.rows.len());
    Ok(())
}

/// Add a customer.
pub async fn add(ctx: &mut Context, name: &str, tax_id: &str, phone: &str) -> Result<(), CliError> {
    let record = CustomerRecord::new(name.trim(), tax_id.trim(), phone.trim());
    let outcome = RecordTable::new(&ctx.backend, &ctx.busy)
        .create(&mut ctx.state, record)
        .await;
    ctx.finish(outcome)
}

/// Update the given fields of a customer.
pub async fn update(
    ctx: &mut Context,
    key: &str,
    name: Option<String>,
    tax_id: Option<String>,
    phone: Option<String>,
) -> Result<(), CliError> {
    let key = parse_key(key)?;
    load(ctx).await?;

    let patch = RecordPatch {
        full_name: name,
        tax_id,
        phone_number: phone,
    };
    let outcome = RecordTable::new(&ctx.backend, &ctx.busy)
        .with_strategy(ctx.strategy)
        .update(&mut ctx.state, key, patch)
        .await;
    ctx.finish(outcome)
}

/// Delete a customer.
pub async fn delete(ctx: &mut Context, key: &str, yes: bool) -> Result<(), CliError> {
    let key = parse_key(key)?;
    load(ctx).await?;

    if !RecordTable::<HttpBackend>::request_delete(&mut ctx.state, key).is_completed() {
        return ctx.finish(Outcome::Failed);
    }
    if let Some(pending) = ctx.state.pending.take() {
        tracing::info!("{}", pending.prompt());
    }

    let outcome = RecordTable::new(&ctx.backend, &ctx.busy)
        .delete(&mut ctx.state, key, Confirmation::from(yes))
        .await;
    ctx.finish(outcome)
}
