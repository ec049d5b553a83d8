//! Function app host names and zip deployment

use crate::azcli::{AzCli, provider_path};
use crate::error::{Result, ResultExt};
use azdev_cloud::CloudError;
use serde::{Deserialize, Serialize};

const API_VERSION: &str = "2023-01-01";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AzCliFunctionAppProperties {
    pub host_names: Vec<String>,
}

impl AzCli {
    pub async fn get_function_app_properties(
        &self,
        subscription_id: &str,
        resource_group: &str,
        app_name: &str,
    ) -> Result<AzCliFunctionAppProperties> {
        let path = provider_path(
            subscription_id,
            resource_group,
            &format!("Microsoft.Web/sites/{}", app_name),
        );

        let site: ArmSite = self
            .arm
            .get(&path, API_VERSION)
            .await
            .context("failed retrieving function app properties")?;

        let host_name = site
            .properties
            .and_then(|p| p.default_host_name)
            .ok_or_else(|| CloudError::InvalidResponse(format!("{} has no default host name", app_name)))
            .context("failed retrieving function app properties")?;

        Ok(AzCliFunctionAppProperties {
            host_names: vec![host_name],
        })
    }

    /// Deploy a zip package and return Kudu's final status text
    pub async fn deploy_function_app_using_zip_file(
        &self,
        subscription_id: &str,
        resource_group: &str,
        app_name: &str,
        deploy_zip: impl Into<reqwest::Body>,
    ) -> Result<String> {
        tracing::debug!(
            "zip deploy to {} ({}/{})",
            app_name,
            subscription_id,
            resource_group
        );
        let status = self.zip_deploy.deploy(app_name, deploy_zip).await?;
        Ok(status.status_text)
    }
}

#[derive(Debug, Deserialize)]
struct ArmSite {
    properties: Option<ArmSiteProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArmSiteProperties {
    default_host_name: Option<String>,
}
