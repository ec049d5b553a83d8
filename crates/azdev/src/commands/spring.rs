use crate::context::Context;
use azdev_azcli::{ArmSpringService, SpringService};
use colored::Colorize;
use std::path::Path;

async fn service(ctx: &Context) -> anyhow::Result<ArmSpringService> {
    let az = ctx.az_cli().await?;
    Ok(ArmSpringService::new(az.arm().clone(), az.subscription_id()))
}

pub async fn show(
    ctx: &Context,
    resource_group: &str,
    instance: &str,
    app: &str,
) -> anyhow::Result<()> {
    let props = service(ctx)
        .await?
        .get_spring_app_properties(resource_group, instance, app)
        .await?;

    println!("{}", app.cyan().bold());
    match props.url.first() {
        Some(url) => super::print_field("url", url),
        None => super::print_field("url", "(not public)".dimmed()),
    }
    Ok(())
}

pub async fn upload(
    ctx: &Context,
    resource_group: &str,
    instance: &str,
    app: &str,
    artifact: &Path,
) -> anyhow::Result<()> {
    let relative_path = service(ctx)
        .await?
        .upload_spring_artifact(resource_group, instance, app, artifact)
        .await?;

    println!("{}", relative_path);
    Ok(())
}

pub async fn deploy(
    ctx: &Context,
    resource_group: &str,
    instance: &str,
    app: &str,
    artifact: &Path,
    deployment: &str,
) -> anyhow::Result<()> {
    let spring = service(ctx).await?;

    println!(
        "{} {}",
        "Uploading".blue(),
        artifact.display().to_string().cyan()
    );
    let relative_path = spring
        .upload_spring_artifact(resource_group, instance, app, artifact)
        .await?;

    println!(
        "{} {}/{}",
        "Deploying".blue(),
        app.cyan(),
        deployment.cyan()
    );
    let name = spring
        .deploy_spring_app_artifact(resource_group, instance, app, &relative_path, deployment)
        .await?;

    println!("{} {} is active", "✓".green(), name);
    Ok(())
}

pub async fn deployment(
    ctx: &Context,
    resource_group: &str,
    instance: &str,
    app: &str,
    deployment: &str,
) -> anyhow::Result<()> {
    let name = service(ctx)
        .await?
        .get_spring_app_deployment(resource_group, instance, app, deployment)
        .await?;

    println!("{} {}", "✓".green(), name);
    Ok(())
}
