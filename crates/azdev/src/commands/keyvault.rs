use crate::context::Context;
use azdev_azcli::AzCliError;
use colored::Colorize;

pub async fn show(ctx: &Context, resource_group: &str, name: &str) -> anyhow::Result<()> {
    let az = ctx.az_cli().await?;
    let vault = az.get_key_vault(resource_group, name).await?;

    println!("{}", vault.name.cyan().bold());
    super::print_field("id", &vault.id);
    super::print_field("location", &vault.location);
    super::print_field("soft delete", yes_no(vault.properties.enable_soft_delete));
    super::print_field(
        "purge protection",
        yes_no(vault.properties.enable_purge_protection),
    );
    Ok(())
}

pub async fn secret(ctx: &Context, vault: &str, secret: &str) -> anyhow::Result<()> {
    let az = ctx.az_cli().await?;
    match az.get_key_vault_secret(vault, secret).await {
        Ok(secret) => {
            tracing::debug!("read secret {} version {}", secret.name, secret.id);
            println!("{}", secret.value);
            Ok(())
        }
        Err(AzCliError::SecretNotFound) => Err(anyhow::anyhow!(
            "secret '{}' was not found in key vault '{}'",
            secret,
            vault
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn purge(ctx: &Context, name: &str, location: &str) -> anyhow::Result<()> {
    let az = ctx.az_cli().await?;
    println!("{} {} ({})", "Purging key vault".blue(), name.cyan(), location);
    az.purge_key_vault(name, location).await?;
    println!("{}", "✓ Purged".green());
    Ok(())
}

fn yes_no(flag: bool) -> colored::ColoredString {
    if flag { "enabled".green() } else { "disabled".yellow() }
}
