use crate::context::Context;
use colored::Colorize;

pub async fn show(ctx: &Context, resource_id: &str, api_version: &str) -> anyhow::Result<()> {
    let az = ctx.az_cli().await?;
    let resource = az
        .get_resource(az.subscription_id(), resource_id, api_version)
        .await?;

    println!("{}", resource.name.cyan().bold());
    super::print_field("id", &resource.id);
    super::print_field("type", &resource.resource_type);
    super::print_field("location", &resource.location);
    if let Some(kind) = &resource.kind {
        super::print_field("kind", kind);
    }
    Ok(())
}
