//! Azure management-plane facade for azdev
//!
//! Each service forwards to a Resource Manager (or Key Vault / Graph / SCM)
//! call and maps the response into a small local struct. Known failure modes
//! are promoted to named [`AzCliError`] variants; everything else is wrapped
//! with a short context message.
//!
//! # Example
//!
//! ```ignore
//! use azdev_azcli::{AzCli, AzCliArgs};
//! use azdev_cloud::{AzureCliCredential, ClientOptions};
//! use azdev_config::CloudName;
//!
//! let args = AzCliArgs::from_credential(
//!     AzureCliCredential::new(None)?,
//!     "00000000-0000-0000-0000-000000000000",
//!     CloudName::AzurePublic.endpoints(),
//!     ClientOptions::default(),
//! )?;
//! let az = AzCli::new(args);
//!
//! let vault = az.get_key_vault("my-rg", "my-vault").await?;
//! match az.get_key_vault_secret("my-vault", "db-password").await {
//!     Err(azdev_azcli::AzCliError::SecretNotFound) => println!("not set"),
//!     other => println!("{:?}", other?),
//! }
//! ```

pub mod azcli;
pub mod error;
pub mod function_app;
pub mod graph;
pub mod keyvault;
pub mod managed_clusters;
pub mod resources;
pub mod spring_app;
pub mod user_profile;
pub mod zip_deploy;

pub use azcli::{AzCli, AzCliArgs, SecretsClientFactory, default_secrets_client_factory};
pub use error::{AzCliError, Result};
pub use function_app::AzCliFunctionAppProperties;
pub use graph::{GraphClient, GraphClientFactory, UserProfile};
pub use keyvault::{
    AzCliKeyVault, AzCliKeyVaultProperties, AzCliKeyVaultSecret, KeyVaultSecretId, SecretsClient,
};
pub use managed_clusters::{
    ArmManagedClustersService, CredentialResult, CredentialResults, ManagedClustersService,
};
pub use resources::AzCliResource;
pub use spring_app::{ArmSpringService, SpringAppProperties, SpringService};
pub use user_profile::{AzCliAccessToken, UserProfileService};
pub use zip_deploy::{DeployStatus, ZipDeployClient};
