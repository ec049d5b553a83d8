mod commands;
mod context;

use clap::{Parser, Subcommand};
use context::Context;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "azdev")]
#[command(about = "Provision, inspect and deploy Azure resources from your terminal.", long_about = None)]
struct Cli {
    /// Print debug logs (HTTP requests, az invocations, polling)
    #[arg(long, global = true)]
    debug: bool,

    /// Subscription to operate on
    #[arg(long, global = true, env = "AZURE_SUBSCRIPTION_ID")]
    subscription: Option<String>,

    /// Tenant to authenticate against
    #[arg(long, global = true, env = "AZURE_TENANT_ID")]
    tenant: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generic resource lookup
    #[command(subcommand)]
    Resource(ResourceCommands),
    /// Key Vault vaults and secrets
    #[command(subcommand)]
    Keyvault(KeyvaultCommands),
    /// AKS managed clusters
    #[command(subcommand)]
    Aks(AksCommands),
    /// App Service function apps
    #[command(subcommand)]
    Func(FuncCommands),
    /// Azure Spring Apps
    #[command(subcommand)]
    Spring(SpringCommands),
    /// Signed-in identity
    #[command(subcommand)]
    Auth(AuthCommands),
    /// Settings
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ResourceCommands {
    /// Show a resource by its full ID
    Show {
        /// Resource ID (/subscriptions/.../providers/...)
        resource_id: String,
        /// API version of the resource provider
        #[arg(long)]
        api_version: String,
    },
}

#[derive(Subcommand)]
enum KeyvaultCommands {
    /// Show a vault
    Show {
        name: String,
        #[arg(short = 'g', long)]
        resource_group: String,
    },
    /// Print the current value of a secret
    Secret {
        /// Vault name or https:// vault URL
        vault: String,
        secret: String,
    },
    /// Permanently delete a soft-deleted vault
    Purge {
        name: String,
        /// Location the vault was deleted from
        #[arg(short, long)]
        location: String,
    },
}

#[derive(Subcommand)]
enum AksCommands {
    /// Fetch kubeconfig credentials for a cluster
    Credentials {
        name: String,
        #[arg(short = 'g', long)]
        resource_group: String,
        /// Fetch cluster admin credentials instead of user credentials
        #[arg(long)]
        admin: bool,
        /// Write each kubeconfig to this directory instead of stdout
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum FuncCommands {
    /// Show a function app's host names
    Show {
        name: String,
        #[arg(short = 'g', long)]
        resource_group: String,
    },
    /// Deploy a zip package
    Deploy {
        name: String,
        #[arg(short = 'g', long)]
        resource_group: String,
        /// Zip package to deploy
        package: PathBuf,
    },
}

#[derive(Subcommand)]
enum SpringCommands {
    /// Show an app's public URL
    Show {
        app: String,
        #[arg(short = 'g', long)]
        resource_group: String,
        /// Spring Apps instance name
        #[arg(short = 's', long)]
        service: String,
    },
    /// Upload a jar and print its relative path
    Upload {
        app: String,
        #[arg(short = 'g', long)]
        resource_group: String,
        #[arg(short = 's', long)]
        service: String,
        artifact: PathBuf,
    },
    /// Upload a jar, update the deployment and make it active
    Deploy {
        app: String,
        #[arg(short = 'g', long)]
        resource_group: String,
        #[arg(short = 's', long)]
        service: String,
        artifact: PathBuf,
        #[arg(short, long, default_value = "default")]
        deployment: String,
    },
    /// Check that a deployment exists
    Deployment {
        app: String,
        #[arg(short = 'g', long)]
        resource_group: String,
        #[arg(short = 's', long)]
        service: String,
        deployment: String,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Print a Resource Manager access token as JSON
    Token,
    /// Show the signed-in user
    Whoami,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the resolved configuration
    Show,
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    // stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    // Versionコマンドは設定ファイル不要
    if matches!(cli.command, Commands::Version) {
        println!("azdev {}", env!("CARGO_PKG_VERSION"));
        println!("{}", azdev_cloud::user_agent());
        return Ok(());
    }

    let ctx = Context::load(cli.subscription, cli.tenant)?;

    match cli.command {
        Commands::Resource(ResourceCommands::Show {
            resource_id,
            api_version,
        }) => commands::resource::show(&ctx, &resource_id, &api_version).await,
        Commands::Keyvault(cmd) => match cmd {
            KeyvaultCommands::Show {
                name,
                resource_group,
            } => commands::keyvault::show(&ctx, &resource_group, &name).await,
            KeyvaultCommands::Secret { vault, secret } => {
                commands::keyvault::secret(&ctx, &vault, &secret).await
            }
            KeyvaultCommands::Purge { name, location } => {
                commands::keyvault::purge(&ctx, &name, &location).await
            }
        },
        Commands::Aks(AksCommands::Credentials {
            name,
            resource_group,
            admin,
            output_dir,
        }) => {
            commands::aks::credentials(&ctx, &resource_group, &name, admin, output_dir.as_deref())
                .await
        }
        Commands::Func(cmd) => match cmd {
            FuncCommands::Show {
                name,
                resource_group,
            } => commands::func::show(&ctx, &resource_group, &name).await,
            FuncCommands::Deploy {
                name,
                resource_group,
                package,
            } => commands::func::deploy(&ctx, &resource_group, &name, &package).await,
        },
        Commands::Spring(cmd) => match cmd {
            SpringCommands::Show {
                app,
                resource_group,
                service,
            } => commands::spring::show(&ctx, &resource_group, &service, &app).await,
            SpringCommands::Upload {
                app,
                resource_group,
                service,
                artifact,
            } => commands::spring::upload(&ctx, &resource_group, &service, &app, &artifact).await,
            SpringCommands::Deploy {
                app,
                resource_group,
                service,
                artifact,
                deployment,
            } => {
                commands::spring::deploy(
                    &ctx,
                    &resource_group,
                    &service,
                    &app,
                    &artifact,
                    &deployment,
                )
                .await
            }
            SpringCommands::Deployment {
                app,
                resource_group,
                service,
                deployment,
            } => {
                commands::spring::deployment(&ctx, &resource_group, &service, &app, &deployment)
                    .await
            }
        },
        Commands::Auth(cmd) => match cmd {
            AuthCommands::Token => commands::auth::token(&ctx).await,
            AuthCommands::Whoami => commands::auth::whoami(&ctx).await,
        },
        Commands::Config(ConfigCommands::Show) => commands::config::show(&ctx),
        Commands::Version => Ok(()),
    }
}
