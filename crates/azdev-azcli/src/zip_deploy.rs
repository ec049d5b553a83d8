//! App Service zip deployment through the SCM (Kudu) endpoint

use azdev_cloud::{CloudError, Pipeline, header_url, parse_retry_after};
use azdev_config::CloudEndpoints;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use url::Url;

type Result<T> = std::result::Result<T, CloudError>;

/// Kudu deployment status codes
const STATUS_FAILED: i32 = 3;
const STATUS_SUCCESS: i32 = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeployStatus {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub log_url: Option<String>,
}

/// Client for `POST /api/zipdeploy`
#[derive(Clone)]
pub struct ZipDeployClient {
    pipeline: Pipeline,
    endpoints: CloudEndpoints,
    base_url: Option<String>,
}

impl ZipDeployClient {
    pub fn new(pipeline: Pipeline, endpoints: &CloudEndpoints) -> Self {
        Self {
            pipeline,
            endpoints: endpoints.clone(),
            base_url: None,
        }
    }

    /// Send every app's deployment to one host instead of `{app}.{scm suffix}`
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn deploy_url(&self, app_name: &str) -> Result<Url> {
        let base = match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => self.endpoints.scm_url(app_name),
        };
        Ok(Url::parse(&format!("{}/api/zipdeploy?isAsync=true", base))?)
    }

    /// Upload a zip package and wait for Kudu to finish deploying it
    pub async fn deploy(&self, app_name: &str, zip: impl Into<reqwest::Body>) -> Result<DeployStatus> {
        let url = self.deploy_url(app_name)?;
        tracing::info!("Uploading zip package to {}", url.host_str().unwrap_or_default());

        let response = self
            .pipeline
            .send(
                self.pipeline
                    .request(Method::POST, url.clone())
                    .header(CONTENT_TYPE, "application/octet-stream")
                    .body(zip),
            )
            .await?;

        if response.status() != StatusCode::ACCEPTED {
            // Synchronous deployment, nothing to poll
            let body = response.bytes().await?;
            let status = serde_json::from_slice::<DeployStatus>(&body).unwrap_or(DeployStatus {
                status: STATUS_SUCCESS,
                complete: true,
                ..DeployStatus::default()
            });
            return finish(status);
        }

        let mut status_url = header_url(response.headers(), LOCATION.as_str(), &url)?.ok_or_else(|| {
            CloudError::InvalidResponse("zip deploy accepted without a Location header".to_string())
        })?;
        let mut delay = parse_retry_after(response.headers()).unwrap_or(self.pipeline.options().poll_frequency);

        loop {
            tokio::time::sleep(delay).await;

            let response = self
                .pipeline
                .send(self.pipeline.request(Method::GET, status_url.clone()))
                .await?;
            delay = parse_retry_after(response.headers()).unwrap_or(self.pipeline.options().poll_frequency);
            if let Some(next) = header_url(response.headers(), LOCATION.as_str(), &status_url)? {
                status_url = next;
            }

            if response.status() == StatusCode::ACCEPTED {
                continue;
            }

            let status: DeployStatus = serde_json::from_slice(&response.bytes().await?)?;
            tracing::debug!("zip deploy {} status {} ({})", status.id, status.status, status.status_text);
            if status.complete {
                return finish(status);
            }
        }
    }
}

fn finish(status: DeployStatus) -> Result<DeployStatus> {
    if status.status == STATUS_SUCCESS {
        return Ok(status);
    }

    let kind = if status.status == STATUS_FAILED { "failed" } else { "did not succeed" };
    Err(CloudError::OperationFailed {
        status: status.status.to_string(),
        code: "ZipDeployFailed".to_string(),
        message: format!(
            "deployment {} {}: {}{}",
            status.id,
            kind,
            status.status_text,
            status
                .log_url
                .as_deref()
                .map(|u| format!(" (logs: {})", u))
                .unwrap_or_default()
        ),
    })
}
