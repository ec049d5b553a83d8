//! Shared mock context for facade tests

#![allow(dead_code)]

use async_trait::async_trait;
use azdev_azcli::{AzCli, AzCliArgs, SecretsClient, ZipDeployClient};
use azdev_cloud::{
    AccessToken, ArmClient, ClientOptions, CloudError, MultiTenantCredentialProvider, Pipeline,
    Result, TokenCredential,
};
use azdev_config::CloudEndpoints;
use azure_core::credentials::TokenRequestOptions;
use azure_core::error::ErrorKind;
use azure_core::time::OffsetDateTime;
use chrono::{TimeZone, Utc};
use httpmock::MockServer;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SUBSCRIPTION_ID: &str = "SUBSCRIPTION_ID";

#[derive(Debug)]
pub struct StaticCredential;

#[async_trait]
impl TokenCredential for StaticCredential {
    async fn get_token(
        &self,
        _scopes: &[&str],
        _options: Option<TokenRequestOptions<'_>>,
    ) -> azure_core::Result<AccessToken> {
        let expires_on = OffsetDateTime::from_unix_timestamp(far_future_token_expiry().timestamp())
            .expect("valid timestamp");
        Ok(AccessToken::new("TOKEN", expires_on))
    }
}

/// Always fails with the given message, like `az` printing to stderr
#[derive(Debug)]
pub struct FailingCredential(pub String);

#[async_trait]
impl TokenCredential for FailingCredential {
    async fn get_token(
        &self,
        _scopes: &[&str],
        _options: Option<TokenRequestOptions<'_>>,
    ) -> azure_core::Result<AccessToken> {
        Err(azure_core::Error::with_message(
            ErrorKind::Credential,
            self.0.clone(),
        ))
    }
}

/// Hands out one credential and records which tenants were asked for
pub struct RecordingProvider {
    pub credential: Arc<dyn TokenCredential>,
    pub tenants: Mutex<Vec<String>>,
}

impl RecordingProvider {
    pub fn new(credential: Arc<dyn TokenCredential>) -> Self {
        Self {
            credential,
            tenants: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MultiTenantCredentialProvider for RecordingProvider {
    async fn get_token_credential(&self, tenant_id: &str) -> Result<Arc<dyn TokenCredential>> {
        self.tenants.lock().unwrap().push(tenant_id.to_string());
        Ok(self.credential.clone())
    }
}

pub fn options() -> ClientOptions {
    ClientOptions {
        poll_frequency: Duration::from_millis(10),
        ..ClientOptions::default()
    }
}

pub fn endpoints(server: &MockServer) -> CloudEndpoints {
    CloudEndpoints {
        resource_manager: server.base_url(),
        graph: server.base_url(),
        active_directory: server.base_url(),
        ..CloudEndpoints::default()
    }
}

pub fn pipeline() -> Pipeline {
    Pipeline::new(
        Arc::new(StaticCredential),
        vec!["https://management.core.windows.net//.default".to_string()],
        options(),
    )
    .unwrap()
}

pub fn arm_client(server: &MockServer) -> ArmClient {
    ArmClient::from_pipeline(pipeline(), &server.base_url())
}

/// `AzCli` wired against the mock server.
///
/// Secrets clients are all pointed at the server; the vault URLs the
/// facade asked for are recorded in the returned list.
pub fn az_cli(server: &MockServer) -> (AzCli, Arc<Mutex<Vec<String>>>) {
    let requested_vaults = Arc::new(Mutex::new(Vec::new()));
    let recorder = requested_vaults.clone();
    let base_url = server.base_url();
    let secrets_pipeline = pipeline();

    let args = AzCliArgs {
        subscription_id: SUBSCRIPTION_ID.to_string(),
        endpoints: endpoints(server),
        arm: arm_client(server),
        zip_deploy: ZipDeployClient::new(pipeline(), &endpoints(server))
            .with_base_url(server.base_url()),
        secrets_client_factory: Arc::new(move |vault_url: &str| {
            recorder.lock().unwrap().push(vault_url.to_string());
            Ok::<_, CloudError>(SecretsClient::new(
                secrets_pipeline.clone(),
                base_url.clone(),
            ))
        }),
    };

    (AzCli::new(args), requested_vaults)
}

pub fn far_future_token_expiry() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap()
}
