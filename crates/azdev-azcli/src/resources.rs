//! Generic resource lookup by full resource ID

use crate::azcli::AzCli;
use crate::error::{Result, ResultExt};
use serde::{Deserialize, Serialize};

/// Generic resource looked up by ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzCliResource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl AzCli {
    /// Read any resource by its full ID
    pub async fn get_resource(
        &self,
        subscription_id: &str,
        resource_id: &str,
        api_version: &str,
    ) -> Result<AzCliResource> {
        tracing::debug!("get resource {} (subscription {})", resource_id, subscription_id);
        self.arm
            .get(resource_id, api_version)
            .await
            .context("getting resource by id")
    }
}
