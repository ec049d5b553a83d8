use crate::context::Context;
use anyhow::Context as _;
use colored::Colorize;
use std::path::Path;

pub async fn show(ctx: &Context, resource_group: &str, name: &str) -> anyhow::Result<()> {
    let az = ctx.az_cli().await?;
    let props = az
        .get_function_app_properties(az.subscription_id(), resource_group, name)
        .await?;

    println!("{}", name.cyan().bold());
    for host_name in &props.host_names {
        super::print_field("host", format!("https://{}", host_name));
    }
    Ok(())
}

pub async fn deploy(
    ctx: &Context,
    resource_group: &str,
    name: &str,
    package: &Path,
) -> anyhow::Result<()> {
    let zip = tokio::fs::read(package)
        .await
        .with_context(|| format!("failed to read {}", package.display()))?;

    let az = ctx.az_cli().await?;
    println!(
        "{} {} ({} bytes)",
        "Deploying".blue(),
        name.cyan(),
        zip.len()
    );
    let status = az
        .deploy_function_app_using_zip_file(az.subscription_id(), resource_group, name, zip)
        .await?;

    println!("{} {}", "✓".green(), status);
    Ok(())
}
