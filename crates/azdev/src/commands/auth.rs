use crate::context::Context;
use azdev_azcli::AzCliError;
use colored::Colorize;

pub async fn token(ctx: &Context) -> anyhow::Result<()> {
    let token = ctx
        .user_profile()
        .get_access_token(ctx.tenant_id())
        .await
        .map_err(login_hint)?;

    println!("{}", serde_json::to_string_pretty(&token)?);
    Ok(())
}

pub async fn whoami(ctx: &Context) -> anyhow::Result<()> {
    let user = ctx
        .user_profile()
        .get_signed_in_user(ctx.tenant_id())
        .await
        .map_err(login_hint)?;

    let title = user
        .display_name
        .as_deref()
        .or(user.user_principal_name.as_deref())
        .unwrap_or(&user.id);
    println!("{}", title.cyan().bold());
    super::print_field("id", &user.id);
    if let Some(upn) = &user.user_principal_name {
        super::print_field("user principal name", upn);
    }
    if let Some(mail) = &user.mail {
        super::print_field("mail", mail);
    }
    Ok(())
}

fn login_hint(err: AzCliError) -> anyhow::Error {
    if matches!(
        err,
        AzCliError::NotLoggedIn | AzCliError::RefreshTokenExpired
    ) {
        eprintln!("{}", "✗ Not signed in".red().bold());
        eprintln!("  run {} and try again", "az login".cyan());
    }
    err.into()
}
