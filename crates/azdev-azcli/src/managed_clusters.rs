//! Azure Kubernetes Service (AKS) managed clusters

use crate::azcli::provider_path;
use crate::error::Result;
use async_trait::async_trait;
use azdev_cloud::{ArmClient, CloudError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

const API_VERSION: &str = "2023-10-01";

/// Kubeconfig files returned for a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialResults {
    pub kubeconfigs: Vec<CredentialResult>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialResult {
    pub name: String,
    /// Decoded kubeconfig YAML
    pub value: Vec<u8>,
}

/// Actions on top of AKS managed clusters
#[async_trait]
pub trait ManagedClustersService: Send + Sync {
    /// Gets the admin credentials for the specified resource
    async fn get_admin_credentials(
        &self,
        subscription_id: &str,
        resource_group: &str,
        resource_name: &str,
    ) -> Result<CredentialResults>;

    /// Gets the user credentials for the specified resource
    async fn get_user_credentials(
        &self,
        subscription_id: &str,
        resource_group: &str,
        resource_name: &str,
    ) -> Result<CredentialResults>;
}

/// [`ManagedClustersService`] backed by Resource Manager
#[derive(Clone)]
pub struct ArmManagedClustersService {
    arm: ArmClient,
}

impl ArmManagedClustersService {
    pub fn new(arm: ArmClient) -> Self {
        Self { arm }
    }

    async fn list_credentials(
        &self,
        subscription_id: &str,
        resource_group: &str,
        resource_name: &str,
        action: &str,
    ) -> Result<CredentialResults> {
        let path = provider_path(
            subscription_id,
            resource_group,
            &format!(
                "Microsoft.ContainerService/managedClusters/{}/{}",
                resource_name, action
            ),
        );

        let response: ArmCredentialResults = self.arm.post::<_, ()>(&path, API_VERSION, None).await?;
        Ok(response.decode()?)
    }
}

#[async_trait]
impl ManagedClustersService for ArmManagedClustersService {
    async fn get_admin_credentials(
        &self,
        subscription_id: &str,
        resource_group: &str,
        resource_name: &str,
    ) -> Result<CredentialResults> {
        self.list_credentials(
            subscription_id,
            resource_group,
            resource_name,
            "listClusterAdminCredential",
        )
        .await
    }

    async fn get_user_credentials(
        &self,
        subscription_id: &str,
        resource_group: &str,
        resource_name: &str,
    ) -> Result<CredentialResults> {
        self.list_credentials(
            subscription_id,
            resource_group,
            resource_name,
            "listClusterUserCredential",
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
struct ArmCredentialResults {
    #[serde(default)]
    kubeconfigs: Vec<ArmCredentialResult>,
}

#[derive(Debug, Deserialize)]
struct ArmCredentialResult {
    name: String,
    value: String,
}

impl ArmCredentialResults {
    fn decode(self) -> std::result::Result<CredentialResults, CloudError> {
        let kubeconfigs = self
            .kubeconfigs
            .into_iter()
            .map(|c| {
                let value = STANDARD.decode(c.value.as_bytes()).map_err(|e| {
                    CloudError::InvalidResponse(format!("kubeconfig {} is not base64: {}", c.name, e))
                })?;
                Ok(CredentialResult {
                    name: c.name,
                    value,
                })
            })
            .collect::<std::result::Result<Vec<_>, CloudError>>()?;

        Ok(CredentialResults { kubeconfigs })
    }
}
