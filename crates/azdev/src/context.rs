//! Per-invocation wiring: config, credentials and the facade

use azdev_azcli::{AzCli, AzCliArgs, GraphClient, UserProfileService};
use azdev_cloud::{
    ClientOptions, DefaultCredentialProvider, MultiTenantCredentialProvider, TokenCredential,
};
use azdev_config::{CloudEndpoints, Config};
use std::sync::Arc;

pub struct Context {
    pub config: Config,
    subscription_id: Option<String>,
    tenant_id: String,
    provider: Arc<DefaultCredentialProvider>,
}

impl Context {
    /// Load the config and let command-line flags win over it
    pub fn load(subscription: Option<String>, tenant: Option<String>) -> anyhow::Result<Self> {
        let config = Config::load()?;

        let subscription_id = subscription
            .filter(|s| !s.is_empty())
            .or_else(|| config.subscription_id.clone());
        let tenant_id = tenant
            .filter(|t| !t.is_empty())
            .or_else(|| config.tenant_id.clone())
            .unwrap_or_default();

        let provider = Arc::new(DefaultCredentialProvider::new(
            config.endpoints().active_directory,
        ));

        Ok(Self {
            config,
            subscription_id,
            tenant_id,
            provider,
        })
    }

    pub fn endpoints(&self) -> CloudEndpoints {
        self.config.endpoints()
    }

    pub fn options(&self) -> ClientOptions {
        ClientOptions {
            poll_frequency: self.config.poll_frequency(),
            ..ClientOptions::default()
        }
    }

    /// Empty means the home tenant of the signed-in account
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn subscription_id(&self) -> anyhow::Result<&str> {
        self.subscription_id.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "no subscription selected: pass --subscription, set AZURE_SUBSCRIPTION_ID, or add subscription_id to config.yaml"
            )
        })
    }

    pub async fn credential(&self) -> anyhow::Result<Arc<dyn TokenCredential>> {
        let credential = self.provider.get_token_credential(&self.tenant_id).await?;
        tracing::debug!("using credential {:?}", credential);
        Ok(credential)
    }

    pub async fn az_cli(&self) -> anyhow::Result<AzCli> {
        let args = AzCliArgs::from_credential(
            self.credential().await?,
            self.subscription_id()?,
            self.endpoints(),
            self.options(),
        )?;
        Ok(AzCli::new(args))
    }

    pub fn user_profile(&self) -> UserProfileService {
        UserProfileService::new(
            self.provider.clone(),
            GraphClient::factory(self.endpoints(), self.options()),
            self.endpoints(),
        )
    }
}
