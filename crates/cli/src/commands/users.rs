//! User account commands (admin only).

use roster_admin::backend::{HttpBackend, UserAccountPatch};
use roster_admin::controllers::{Confirmation, Outcome, UserAdmin};
use roster_core::{Role, UserRef};

use super::{CliError, Context, secret_from_env};

const NEW_PASSWORD_VAR: &str = "ROSTER_NEW_PASSWORD";

fn parse_role(role: &str) -> Result<Role, CliError> {
    role.parse::<Role>().map_err(CliError::InvalidArgument)
}

/// List accounts.
pub async fn list(ctx: &mut Context) -> Result<(), CliError> {
    let outcome = UserAdmin::new(&ctx.backend, &ctx.busy)
        .list(&mut ctx.state)
        .await;
    if outcome.is_completed() {
        for account in &ctx.state.users {
            tracing::info!(
                "{:<8} {:<24} {}",
                account.reference().to_string(),
                account.username,
                account.role
            );
        }
    }
    ctx.finish(outcome)
}

/// Create an account with the password from `ROSTER_NEW_PASSWORD`.
pub async fn create(ctx: &mut Context, username: &str, role: &str) -> Result<(), CliError> {
    let role = parse_role(role)?;
    let password = secret_from_env(NEW_PASSWORD_VAR)?;

    let outcome = UserAdmin::new(&ctx.backend, &ctx.busy)
        .create(&mut ctx.state, username, password, role)
        .await;
    if let Some(error) = ctx.state.user_form_error.take() {
        return Err(CliError::Failed(error));
    }
    ctx.finish(outcome)
}

/// Change an account's role and/or password.
pub async fn update(
    ctx: &mut Context,
    user: &str,
    role: Option<&str>,
    password: bool,
) -> Result<(), CliError> {
    let Ok(user) = user.parse::<UserRef>();
    let patch = UserAccountPatch {
        password: password
            .then(|| secret_from_env(NEW_PASSWORD_VAR))
            .transpose()?,
        role: role.map(parse_role).transpose()?,
    };

    let outcome = UserAdmin::new(&ctx.backend, &ctx.busy)
        .update(&mut ctx.state, &user, patch)
        .await;
    ctx.finish(outcome)
}

/// Delete an account.
pub async fn delete(ctx: &mut Context, user: &str, yes: bool) -> Result<(), CliError> {
    let Ok(user) = user.parse::<UserRef>();
    let admin = UserAdmin::new(&ctx.backend, &ctx.busy);

    // Load first so the prompt can name the account
    admin.list(&mut ctx.state).await;
    if !UserAdmin::<HttpBackend>::request_delete(&mut ctx.state, user.clone()).is_completed() {
        return ctx.finish(Outcome::Failed);
    }
    if let Some(pending) = ctx.state.pending.take() {
        tracing::info!("{}", pending.prompt());
    }

    let outcome = admin
        .delete(&mut ctx.state, &user, Confirmation::from(yes))
        .await;
    ctx.finish(outcome)
}
