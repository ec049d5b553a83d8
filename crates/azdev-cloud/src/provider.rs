//! Per-tenant credential selection

use crate::credential::MultiTenantCredentialProvider;
use crate::error::{CloudError, Result};
use async_trait::async_trait;
use azure_core::cloud::{CloudConfiguration, CustomConfiguration};
use azure_core::credentials::{Secret, TokenCredential};
use azure_core::http::ClientOptions as SdkClientOptions;
use azure_identity::{
    AzureCliCredential, AzureCliCredentialOptions, ClientSecretCredential,
    ClientSecretCredentialOptions,
};
use std::sync::Arc;

/// Picks a service principal credential when `AZURE_CLIENT_ID` and
/// `AZURE_CLIENT_SECRET` are set, and the Azure CLI login otherwise.
#[derive(Debug, Clone)]
pub struct DefaultCredentialProvider {
    authority: String,
}

impl DefaultCredentialProvider {
    /// `authority` is the Microsoft Entra host of the target cloud
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
        }
    }

    /// Synchronous part of [`MultiTenantCredentialProvider::get_token_credential`]
    pub fn select(&self, tenant_id: &str) -> Result<Arc<dyn TokenCredential>> {
        let client_id = env_var("AZURE_CLIENT_ID");
        let client_secret = env_var("AZURE_CLIENT_SECRET");

        if let (Some(client_id), Some(client_secret)) = (client_id, client_secret) {
            let tenant = if tenant_id.is_empty() {
                env_var("AZURE_TENANT_ID").ok_or_else(|| {
                    CloudError::InvalidConfig(
                        "AZURE_TENANT_ID is required when using a client secret".to_string(),
                    )
                })?
            } else {
                tenant_id.to_string()
            };

            tracing::debug!("Using client secret credential for tenant {}", tenant);
            let options = ClientSecretCredentialOptions {
                client_options: self.sdk_client_options(),
            };
            let credential: Arc<dyn TokenCredential> = ClientSecretCredential::new(
                &tenant,
                client_id,
                Secret::new(client_secret),
                Some(options),
            )?;
            return Ok(credential);
        }

        tracing::debug!(
            "Using Azure CLI credential for tenant {}",
            if tenant_id.is_empty() { "<home>" } else { tenant_id }
        );
        let options = AzureCliCredentialOptions {
            tenant_id: Some(tenant_id.to_string()).filter(|t| !t.is_empty()),
            ..Default::default()
        };
        let credential: Arc<dyn TokenCredential> = AzureCliCredential::new(Some(options))?;
        Ok(credential)
    }

    fn sdk_client_options(&self) -> SdkClientOptions {
        let mut custom = CustomConfiguration::default();
        custom.authority_host = self.authority.clone();
        SdkClientOptions {
            cloud: Some(Arc::new(CloudConfiguration::from(custom))),
            ..Default::default()
        }
    }
}

#[async_trait]
impl MultiTenantCredentialProvider for DefaultCredentialProvider {
    async fn get_token_credential(&self, tenant_id: &str) -> Result<Arc<dyn TokenCredential>> {
        self.select(tenant_id)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn provider() -> DefaultCredentialProvider {
        DefaultCredentialProvider::new("https://login.microsoftonline.com")
    }

    #[test]
    #[serial]
    fn test_selects_azure_cli_without_client_secret() {
        temp_env::with_vars(
            [
                ("AZURE_CLIENT_ID", None::<&str>),
                ("AZURE_CLIENT_SECRET", None),
            ],
            || {
                let cred = provider().select("tenant-1").unwrap();
                let debug = format!("{:?}", cred);
                assert!(debug.contains("AzureCliCredential"));
                assert!(debug.contains("tenant-1"));
            },
        );
    }

    #[test]
    #[serial]
    fn test_azure_cli_home_tenant() {
        temp_env::with_vars(
            [
                ("AZURE_CLIENT_ID", None::<&str>),
                ("AZURE_CLIENT_SECRET", None),
            ],
            || {
                let cred = provider().select("").unwrap();
                assert!(format!("{:?}", cred).contains("AzureCliCredential"));
            },
        );
    }

    #[test]
    #[serial]
    fn test_selects_client_secret_when_configured() {
        temp_env::with_vars(
            [
                ("AZURE_CLIENT_ID", Some("id")),
                ("AZURE_CLIENT_SECRET", Some("s3cr3t-value")),
                ("AZURE_TENANT_ID", None),
            ],
            || {
                let cred = provider().select("tenant-1").unwrap();
                let debug = format!("{:?}", cred);
                assert!(debug.contains("ClientSecretCredential"));
                assert!(debug.contains("login.microsoftonline.com"));
                assert!(debug.contains("/tenant-1/oauth2/v2.0/token"));
                assert!(!debug.contains("s3cr3t-value"));
            },
        );
    }

    #[test]
    #[serial]
    fn test_client_secret_uses_cloud_authority() {
        temp_env::with_vars(
            [
                ("AZURE_CLIENT_ID", Some("id")),
                ("AZURE_CLIENT_SECRET", Some("secret")),
            ],
            || {
                let cred = DefaultCredentialProvider::new("https://login.chinacloudapi.cn")
                    .select("tenant-1")
                    .unwrap();
                assert!(format!("{:?}", cred).contains("login.chinacloudapi.cn"));
            },
        );
    }

    #[test]
    #[serial]
    fn test_client_secret_needs_a_tenant() {
        temp_env::with_vars(
            [
                ("AZURE_CLIENT_ID", Some("id")),
                ("AZURE_CLIENT_SECRET", Some("secret")),
                ("AZURE_TENANT_ID", None),
            ],
            || {
                let result = provider().select("");
                assert!(matches!(result, Err(CloudError::InvalidConfig(_))));
            },
        );
    }

    #[test]
    #[serial]
    fn test_rejects_malformed_tenant() {
        temp_env::with_vars(
            [
                ("AZURE_CLIENT_ID", None::<&str>),
                ("AZURE_CLIENT_SECRET", None),
            ],
            || {
                let result = provider().select("not a tenant");
                assert!(matches!(result, Err(CloudError::Credential(_))));
            },
        );
    }
}
