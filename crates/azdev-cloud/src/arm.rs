//! Azure Resource Manager client
//!
//! Typed get/post calls plus PUT/POST variants that hand back a [`Poller`].

use crate::error::Result;
use crate::pipeline::{ClientOptions, Pipeline};
use crate::poller::Poller;
use azdev_config::CloudEndpoints;
use azure_core::credentials::TokenCredential;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

/// Resource Manager client shared by every management-plane service
#[derive(Clone)]
pub struct ArmClient {
    pipeline: Pipeline,
    endpoint: String,
}

impl ArmClient {
    pub fn new(
        credential: Arc<dyn TokenCredential>,
        endpoints: &CloudEndpoints,
        options: ClientOptions,
    ) -> Result<Self> {
        let pipeline = Pipeline::new(credential, vec![endpoints.resource_manager_scope()], options)?;
        Ok(Self::from_pipeline(pipeline, &endpoints.resource_manager))
    }

    pub fn from_pipeline(pipeline: Pipeline, endpoint: &str) -> Self {
        Self {
            pipeline,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `{endpoint}/{path}?api-version={api_version}`
    pub fn url(&self, path: &str, api_version: &str) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/{}",
            self.endpoint,
            path.trim_start_matches('/')
        ))?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, api_version: &str) -> Result<T> {
        let url = self.url(path, api_version)?;
        self.pipeline
            .send_json(self.pipeline.request(Method::GET, url))
            .await
    }

    pub async fn post<T, B>(&self, path: &str, api_version: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path, api_version)?;
        let builder = with_body(self.pipeline.request(Method::POST, url), body);
        self.pipeline.send_json(builder).await
    }

    /// Start a create-or-update
    pub async fn begin_put<T, B>(&self, path: &str, api_version: &str, body: &B) -> Result<Poller<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.begin(Method::PUT, path, api_version, Some(body)).await
    }

    /// Start an action such as purge or setActiveDeployments
    pub async fn begin_post<T, B>(
        &self,
        path: &str,
        api_version: &str,
        body: Option<&B>,
    ) -> Result<Poller<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.begin(Method::POST, path, api_version, body).await
    }

    async fn begin<T, B>(
        &self,
        method: Method,
        path: &str,
        api_version: &str,
        body: Option<&B>,
    ) -> Result<Poller<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path, api_version)?;
        let builder = with_body(self.pipeline.request(method.clone(), url.clone()), body);
        let response = self.pipeline.send(builder).await?;

        tracing::info!("Started {} {} ({})", method, url.path(), response.status());
        Poller::from_response(self.pipeline.clone(), method, url, response).await
    }
}

fn with_body<B: Serialize + ?Sized>(builder: RequestBuilder, body: Option<&B>) -> RequestBuilder {
    match body {
        Some(body) => builder.json(body),
        // ARM rejects body-less POSTs without an explicit length
        None => builder.header(CONTENT_LENGTH, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use azure_core::credentials::{AccessToken, TokenRequestOptions};
    use azure_core::time::OffsetDateTime;

    #[derive(Debug)]
    struct NoopCredential;

    #[async_trait]
    impl TokenCredential for NoopCredential {
        async fn get_token(
            &self,
            _scopes: &[&str],
            _options: Option<TokenRequestOptions<'_>>,
        ) -> azure_core::Result<AccessToken> {
            Ok(AccessToken::new("t", OffsetDateTime::now_utc()))
        }
    }

    #[test]
    fn test_url_joins_path_and_api_version() {
        let endpoints = CloudEndpoints {
            resource_manager: "https://management.azure.com/".to_string(),
            ..CloudEndpoints::default()
        };
        let client =
            ArmClient::new(Arc::new(NoopCredential), &endpoints, ClientOptions::default()).unwrap();

        let url = client
            .url("/subscriptions/s/resourceGroups/rg", "2021-04-01")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://management.azure.com/subscriptions/s/resourceGroups/rg?api-version=2021-04-01"
        );

        let url = client.url("RESOURCE_ID", "API_VERSION").unwrap();
        assert_eq!(url.path(), "/RESOURCE_ID");
    }
}
