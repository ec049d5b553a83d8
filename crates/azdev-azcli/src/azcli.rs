//! The `AzCli` facade and its constructor

use crate::keyvault::SecretsClient;
use crate::zip_deploy::ZipDeployClient;
use azdev_cloud::{ArmClient, ClientOptions, CloudError, TokenCredential};
use azdev_config::CloudEndpoints;
use std::sync::Arc;

/// Builds a Key Vault secrets client for a vault URL
pub type SecretsClientFactory =
    Arc<dyn Fn(&str) -> std::result::Result<SecretsClient, CloudError> + Send + Sync>;

/// Everything [`AzCli::new`] wires together
pub struct AzCliArgs {
    pub subscription_id: String,
    pub endpoints: CloudEndpoints,
    pub arm: ArmClient,
    pub zip_deploy: ZipDeployClient,
    pub secrets_client_factory: SecretsClientFactory,
}

impl AzCliArgs {
    /// Build every client from one credential
    pub fn from_credential(
        credential: Arc<dyn TokenCredential>,
        subscription_id: impl Into<String>,
        endpoints: CloudEndpoints,
        options: ClientOptions,
    ) -> azdev_cloud::Result<Self> {
        let arm = ArmClient::new(credential, &endpoints, options)?;
        let zip_deploy = ZipDeployClient::new(arm.pipeline().clone(), &endpoints);
        let secrets_client_factory = default_secrets_client_factory(&arm, &endpoints);

        Ok(Self {
            subscription_id: subscription_id.into(),
            endpoints,
            arm,
            zip_deploy,
            secrets_client_factory,
        })
    }
}

/// Secrets clients share the ARM connection pool but request Key Vault tokens
pub fn default_secrets_client_factory(
    arm: &ArmClient,
    endpoints: &CloudEndpoints,
) -> SecretsClientFactory {
    let pipeline = arm.pipeline().with_scopes(vec![endpoints.key_vault_scope()]);
    Arc::new(move |vault_url: &str| {
        Ok::<_, CloudError>(SecretsClient::new(pipeline.clone(), vault_url))
    })
}

/// Facade over the management-plane clients used by the CLI
#[derive(Clone)]
pub struct AzCli {
    pub(crate) subscription_id: String,
    pub(crate) endpoints: CloudEndpoints,
    pub(crate) arm: ArmClient,
    pub(crate) zip_deploy: ZipDeployClient,
    pub(crate) secrets_client_factory: SecretsClientFactory,
}

impl AzCli {
    pub fn new(args: AzCliArgs) -> Self {
        Self {
            subscription_id: args.subscription_id,
            endpoints: args.endpoints,
            arm: args.arm,
            zip_deploy: args.zip_deploy,
            secrets_client_factory: args.secrets_client_factory,
        }
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    pub fn arm(&self) -> &ArmClient {
        &self.arm
    }
}

/// `/subscriptions/{s}/resourceGroups/{rg}/providers/{provider}`
pub(crate) fn provider_path(subscription_id: &str, resource_group: &str, provider: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/{}",
        subscription_id, resource_group, provider
    )
}
