use crate::context::Context;
use colored::Colorize;

pub fn show(ctx: &Context) -> anyhow::Result<()> {
    match azdev_config::find_config_file()? {
        Some(path) => println!("{} {}", "Config file:".dimmed(), path.display()),
        None => println!("{}", "No config file found, using defaults".dimmed()),
    }

    println!("{}", serde_yaml::to_string(&ctx.config)?);

    let endpoints = ctx.endpoints();
    println!("{}", "Endpoints".bold());
    super::print_field("resource manager", &endpoints.resource_manager);
    super::print_field("graph", &endpoints.graph);
    super::print_field("active directory", &endpoints.active_directory);
    super::print_field("key vault suffix", &endpoints.key_vault_suffix);
    super::print_field("scm suffix", &endpoints.scm_suffix);
    super::print_field(
        "poll frequency",
        format!("{}s", ctx.config.poll_frequency().as_secs()),
    );
    Ok(())
}
