//! Azure Spring Apps (ASA): artifact upload, deployment and queries

use crate::azcli::provider_path;
use crate::error::{AzCliError, Result, ResultExt};
use async_trait::async_trait;
use azdev_cloud::{ArmClient, CloudError, Pipeline, redact_url};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use tokio::io::AsyncReadExt;
use url::Url;

const API_VERSION: &str = "2023-12-01";
const FILE_SERVICE_VERSION: &str = "2019-02-02";
/// Azure Files "Put Range" accepts at most 4 MiB per call
const MAX_RANGE_SIZE: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpringAppProperties {
    pub url: Vec<String>,
}

/// Artifact upload/deploy and queries for Azure Spring Apps
#[async_trait]
pub trait SpringService: Send + Sync {
    /// Get Spring app properties
    async fn get_spring_app_properties(
        &self,
        resource_group: &str,
        instance_name: &str,
        app_name: &str,
    ) -> Result<SpringAppProperties>;

    /// Deploy an uploaded jar to an app deployment and make it active
    async fn deploy_spring_app_artifact(
        &self,
        resource_group: &str,
        instance_name: &str,
        app_name: &str,
        relative_path: &str,
        deployment_name: &str,
    ) -> Result<String>;

    /// Upload a jar to the app's file share, returning its relative path
    async fn upload_spring_artifact(
        &self,
        resource_group: &str,
        instance_name: &str,
        app_name: &str,
        artifact_path: &Path,
    ) -> Result<String>;

    /// Get a Spring app deployment's name
    async fn get_spring_app_deployment(
        &self,
        resource_group: &str,
        instance_name: &str,
        app_name: &str,
        deployment_name: &str,
    ) -> Result<String>;
}

/// [`SpringService`] backed by Resource Manager
#[derive(Clone)]
pub struct ArmSpringService {
    arm: ArmClient,
    subscription_id: String,
}

impl ArmSpringService {
    pub fn new(arm: ArmClient, subscription_id: impl Into<String>) -> Self {
        Self {
            arm,
            subscription_id: subscription_id.into(),
        }
    }

    fn app_path(&self, resource_group: &str, instance_name: &str, app_name: &str) -> String {
        provider_path(
            &self.subscription_id,
            resource_group,
            &format!("Microsoft.AppPlatform/Spring/{}/apps/{}", instance_name, app_name),
        )
    }

    async fn create_or_update_deployment(
        &self,
        app_path: &str,
        deployment_name: &str,
        relative_path: &str,
    ) -> Result<Option<String>> {
        let body = json!({
            "properties": {
                "source": {
                    "type": "Jar",
                    "relativePath": relative_path,
                }
            }
        });

        let poller = self
            .arm
            .begin_put::<Option<NamedResource>, _>(
                &format!("{}/deployments/{}", app_path, deployment_name),
                API_VERSION,
                &body,
            )
            .await?;
        let result = poller.poll_until_done().await?;
        Ok(result.map(|r| r.name))
    }

    async fn active_deployment(&self, app_path: &str, deployment_name: &str) -> Result<Option<String>> {
        let body = json!({ "activeDeploymentNames": [deployment_name] });

        let poller = self
            .arm
            .begin_post::<Option<NamedResource>, _>(
                &format!("{}/setActiveDeployments", app_path),
                API_VERSION,
                Some(&body),
            )
            .await?;
        let result = poller.poll_until_done().await?;
        Ok(result.map(|r| r.name))
    }

    /// Anonymous upload: the URL returned by Spring Apps already carries a SAS token
    async fn upload_to_file_share(
        &self,
        upload_url: &Url,
        file: &mut tokio::fs::File,
        size: u64,
    ) -> std::result::Result<(), CloudError> {
        let pipeline: Pipeline = self.arm.pipeline().without_credential();

        pipeline
            .send(
                pipeline
                    .request(Method::PUT, upload_url.clone())
                    .header("x-ms-version", FILE_SERVICE_VERSION)
                    .header("x-ms-type", "file")
                    .header("x-ms-content-length", size.to_string())
                    .header("x-ms-meta-createdby", "AZD")
                    .header(reqwest::header::CONTENT_LENGTH, 0),
            )
            .await?;

        let mut range_url = upload_url.clone();
        range_url.query_pairs_mut().append_pair("comp", "range");

        let mut offset: u64 = 0;
        let mut buffer = vec![0u8; MAX_RANGE_SIZE];
        while offset < size {
            let read = read_chunk(file, &mut buffer).await?;
            if read == 0 {
                break;
            }
            let end = offset + read as u64 - 1;

            pipeline
                .send(
                    pipeline
                        .request(Method::PUT, range_url.clone())
                        .header("x-ms-version", FILE_SERVICE_VERSION)
                        .header("x-ms-write", "update")
                        .header("x-ms-range", format!("bytes={}-{}", offset, end))
                        .body(buffer[..read].to_vec()),
                )
                .await?;

            offset = end + 1;
        }

        Ok(())
    }
}

/// Fill `buffer` as far as the file allows
async fn read_chunk(file: &mut tokio::fs::File, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        let n = file.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[async_trait]
impl SpringService for ArmSpringService {
    async fn get_spring_app_properties(
        &self,
        resource_group: &str,
        instance_name: &str,
        app_name: &str,
    ) -> Result<SpringAppProperties> {
        let app: ArmSpringApp = self
            .arm
            .get(&self.app_path(resource_group, instance_name, app_name), API_VERSION)
            .await
            .context("failed retrieving spring app properties")?;

        let url = match app.properties {
            Some(ArmSpringAppProperties {
                url: Some(url),
                public: Some(true),
            }) => vec![url],
            _ => Vec::new(),
        };

        Ok(SpringAppProperties { url })
    }

    async fn deploy_spring_app_artifact(
        &self,
        resource_group: &str,
        instance_name: &str,
        app_name: &str,
        relative_path: &str,
        deployment_name: &str,
    ) -> Result<String> {
        let app_path = self.app_path(resource_group, instance_name, app_name);

        self.create_or_update_deployment(&app_path, deployment_name, relative_path)
            .await?;
        tracing::info!("Deployment {} updated, activating", deployment_name);

        let name = self.active_deployment(&app_path, deployment_name).await?;
        Ok(name.unwrap_or_else(|| app_name.to_string()))
    }

    async fn upload_spring_artifact(
        &self,
        resource_group: &str,
        instance_name: &str,
        app_name: &str,
        artifact_path: &Path,
    ) -> Result<String> {
        let display_path = artifact_path.display().to_string();

        let mut file = match tokio::fs::File::open(artifact_path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AzCliError::ArtifactNotFound {
                    path: display_path,
                    source: e,
                });
            }
            Err(e) => {
                return Err(AzCliError::Context {
                    context: format!("reading artifact file {}", display_path),
                    source: e.into(),
                });
            }
        };
        let size = file
            .metadata()
            .await
            .context(format!("reading artifact file {}", display_path))?
            .len();

        let storage: ResourceUploadDefinition = self
            .arm
            .post::<_, ()>(
                &format!(
                    "{}/getResourceUploadUrl",
                    self.app_path(resource_group, instance_name, app_name)
                ),
                API_VERSION,
                None,
            )
            .await
            .context("failed to get resource upload URL")?;

        let upload_url = Url::parse(&storage.upload_url).context(format!(
            "failed to parse storage upload url {}",
            redact_url(&storage.upload_url)
        ))?;

        self.upload_to_file_share(&upload_url, &mut file, size)
            .await
            .context(format!("failed to upload artifact {}", display_path))?;

        tracing::info!("Uploaded {} ({} bytes) to {}", display_path, size, storage.relative_path);
        Ok(storage.relative_path)
    }

    async fn get_spring_app_deployment(
        &self,
        resource_group: &str,
        instance_name: &str,
        app_name: &str,
        deployment_name: &str,
    ) -> Result<String> {
        let deployment: NamedResource = self
            .arm
            .get(
                &format!(
                    "{}/deployments/{}",
                    self.app_path(resource_group, instance_name, app_name),
                    deployment_name
                ),
                API_VERSION,
            )
            .await?;

        Ok(deployment.name)
    }
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ArmSpringApp {
    properties: Option<ArmSpringAppProperties>,
}

#[derive(Debug, Deserialize)]
struct ArmSpringAppProperties {
    url: Option<String>,
    public: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceUploadDefinition {
    relative_path: String,
    upload_url: String,
}
