use crate::context::Context;
use azdev_azcli::{ArmManagedClustersService, ManagedClustersService};
use colored::Colorize;
use std::io::Write;
use std::path::Path;

pub async fn credentials(
    ctx: &Context,
    resource_group: &str,
    name: &str,
    admin: bool,
    output_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let az = ctx.az_cli().await?;
    let clusters = ArmManagedClustersService::new(az.arm().clone());

    let results = if admin {
        clusters
            .get_admin_credentials(az.subscription_id(), resource_group, name)
            .await?
    } else {
        clusters
            .get_user_credentials(az.subscription_id(), resource_group, name)
            .await?
    };

    if results.kubeconfigs.is_empty() {
        anyhow::bail!("cluster '{}' returned no kubeconfig", name);
    }

    match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            for kubeconfig in &results.kubeconfigs {
                let path = dir.join(format!("{}-{}.yaml", name, kubeconfig.name));
                std::fs::write(&path, &kubeconfig.value)?;
                println!("{} {}", "✓ Wrote".green(), path.display().to_string().cyan());
            }
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            for kubeconfig in &results.kubeconfigs {
                stdout.write_all(&kubeconfig.value)?;
            }
            stdout.flush()?;
        }
    }
    Ok(())
}
