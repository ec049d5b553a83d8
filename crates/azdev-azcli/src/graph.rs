//! Minimal Microsoft Graph client

use azdev_cloud::{ClientOptions, CloudError, Pipeline, TokenCredential};
use azdev_config::CloudEndpoints;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Builds a graph client for a credential
pub type GraphClientFactory =
    Arc<dyn Fn(Arc<dyn TokenCredential>) -> Result<GraphClient, CloudError> + Send + Sync>;

/// The signed-in identity as returned by `GET /me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
}

#[derive(Clone)]
pub struct GraphClient {
    pipeline: Pipeline,
    endpoint: String,
}

impl GraphClient {
    pub fn new(
        credential: Arc<dyn TokenCredential>,
        endpoints: &CloudEndpoints,
        options: ClientOptions,
    ) -> Result<Self, CloudError> {
        let pipeline = Pipeline::new(credential, vec![endpoints.graph_scope()], options)?;
        Ok(Self {
            pipeline,
            endpoint: endpoints.graph.trim_end_matches('/').to_string(),
        })
    }

    /// Factory used by [`crate::UserProfileService`]
    pub fn factory(endpoints: CloudEndpoints, options: ClientOptions) -> GraphClientFactory {
        Arc::new(move |credential: Arc<dyn TokenCredential>| {
            GraphClient::new(credential, &endpoints, options.clone())
        })
    }

    pub async fn me(&self) -> Result<UserProfile, CloudError> {
        let url = format!("{}/v1.0/me", self.endpoint);
        self.pipeline
            .send_json(self.pipeline.request(Method::GET, url))
            .await
    }
}
