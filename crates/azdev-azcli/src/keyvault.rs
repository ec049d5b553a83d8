//! Key Vault: vault lookup, secret reads and purge of soft-deleted vaults

use crate::azcli::{AzCli, provider_path};
use crate::error::{AzCliError, Result, ResultExt};
use azdev_cloud::{CloudError, Pipeline};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

const VAULTS_API_VERSION: &str = "2023-07-01";
const SECRETS_API_VERSION: &str = "7.4";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzCliKeyVault {
    pub id: String,
    pub name: String,
    pub location: String,
    pub properties: AzCliKeyVaultProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzCliKeyVaultProperties {
    pub enable_soft_delete: bool,
    pub enable_purge_protection: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzCliKeyVaultSecret {
    /// Secret version
    pub id: String,
    pub name: String,
    pub value: String,
}

impl AzCli {
    pub async fn get_key_vault(
        &self,
        resource_group: &str,
        vault_name: &str,
    ) -> Result<AzCliKeyVault> {
        let path = provider_path(
            &self.subscription_id,
            resource_group,
            &format!("Microsoft.KeyVault/vaults/{}", vault_name),
        );

        let vault: ArmVault = self
            .arm
            .get(&path, VAULTS_API_VERSION)
            .await
            .context("getting key vault")?;

        let properties = vault.properties.unwrap_or_default();
        Ok(AzCliKeyVault {
            id: vault.id,
            name: vault.name,
            location: vault.location,
            properties: AzCliKeyVaultProperties {
                enable_soft_delete: properties.enable_soft_delete.unwrap_or(false),
                enable_purge_protection: properties.enable_purge_protection.unwrap_or(false),
            },
        })
    }

    /// Read the latest version of a secret.
    ///
    /// `vault_name` is either a bare vault name or a full `https://` vault URL.
    pub async fn get_key_vault_secret(
        &self,
        vault_name: &str,
        secret_name: &str,
    ) -> Result<AzCliKeyVaultSecret> {
        let vault_url = if vault_name.to_lowercase().contains("https://") {
            vault_name.to_string()
        } else {
            self.endpoints.key_vault_url(vault_name)
        };

        let client = (self.secrets_client_factory)(&vault_url)?;
        let bundle = client
            .get_secret(secret_name, "")
            .await
            .map_err(|e| match e.status_code() {
                Some(StatusCode::NOT_FOUND) => AzCliError::SecretNotFound,
                _ => AzCliError::Context {
                    context: "getting key vault secret".to_string(),
                    source: e,
                },
            })?;

        let id = KeyVaultSecretId::parse(&bundle.id).context("getting key vault secret")?;
        Ok(AzCliKeyVaultSecret {
            id: id.version,
            name: id.name,
            value: bundle.value.unwrap_or_default(),
        })
    }

    /// Permanently delete a soft-deleted vault
    pub async fn purge_key_vault(&self, vault_name: &str, location: &str) -> Result<()> {
        let path = format!(
            "/subscriptions/{}/providers/Microsoft.KeyVault/locations/{}/deletedVaults/{}/purge",
            self.subscription_id, location, vault_name
        );

        let poller = self
            .arm
            .begin_post::<(), ()>(&path, VAULTS_API_VERSION, None)
            .await
            .context("starting purging key vault")?;

        poller
            .poll_until_done()
            .await
            .context("purging key vault")?;

        tracing::info!("Purged key vault {} in {}", vault_name, location);
        Ok(())
    }
}

/// Key Vault data-plane secrets client
#[derive(Clone)]
pub struct SecretsClient {
    pipeline: Pipeline,
    vault_url: String,
}

impl SecretsClient {
    pub fn new(pipeline: Pipeline, vault_url: impl Into<String>) -> Self {
        Self {
            pipeline,
            vault_url: vault_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// An empty `version` reads the current version
    pub async fn get_secret(
        &self,
        name: &str,
        version: &str,
    ) -> std::result::Result<SecretBundle, CloudError> {
        let mut url = Url::parse(&format!(
            "{}/secrets/{}/{}",
            self.vault_url, name, version
        ))?;
        url.query_pairs_mut()
            .append_pair("api-version", SECRETS_API_VERSION);

        self.pipeline
            .send_json(self.pipeline.request(Method::GET, url))
            .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecretBundle {
    pub id: String,
    pub value: Option<String>,
}

/// Parsed `https://{vault}/secrets/{name}/{version}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVaultSecretId {
    pub vault_url: String,
    pub name: String,
    pub version: String,
}

impl KeyVaultSecretId {
    pub fn parse(id: &str) -> std::result::Result<Self, CloudError> {
        let url = Url::parse(id)?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            ["secrets", name, rest @ ..] if rest.len() <= 1 => Ok(Self {
                vault_url: url.origin().ascii_serialization(),
                name: name.to_string(),
                version: rest.first().map(|v| v.to_string()).unwrap_or_default(),
            }),
            _ => Err(CloudError::InvalidResponse(format!(
                "not a key vault secret id: {}",
                id
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArmVault {
    id: String,
    name: String,
    location: String,
    properties: Option<ArmVaultProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArmVaultProperties {
    enable_soft_delete: Option<bool>,
    enable_purge_protection: Option<bool>,
}
