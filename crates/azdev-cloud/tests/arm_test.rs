//! Resource Manager client and long-running operation tests against a mock server

use async_trait::async_trait;
use azdev_cloud::{
    AccessToken, ArmClient, ClientOptions, CloudError, Pipeline, TokenCredential, user_agent,
};
use azure_core::credentials::TokenRequestOptions;
use azure_core::time::{Duration as TokenDuration, OffsetDateTime};
use httpmock::prelude::*;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Hands out `TOKEN` and counts how often it was asked
#[derive(Debug, Default)]
struct StaticCredential {
    calls: AtomicUsize,
}

#[async_trait]
impl TokenCredential for StaticCredential {
    async fn get_token(
        &self,
        _scopes: &[&str],
        _options: Option<TokenRequestOptions<'_>>,
    ) -> azure_core::Result<AccessToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken::new(
            "TOKEN",
            OffsetDateTime::now_utc() + TokenDuration::hours(1),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

fn client(server: &MockServer) -> ArmClient {
    client_with(server, Arc::new(StaticCredential::default()))
}

fn client_with(server: &MockServer, credential: Arc<StaticCredential>) -> ArmClient {
    let options = ClientOptions {
        poll_frequency: Duration::from_millis(10),
        ..ClientOptions::default()
    };
    let pipeline = Pipeline::new(
        credential,
        vec!["https://management.core.windows.net//.default".to_string()],
        options,
    )
    .unwrap();
    ArmClient::from_pipeline(pipeline, &server.base_url())
}

#[tokio::test]
async fn test_get_sends_user_agent_and_bearer() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/RESOURCE_ID")
                .query_param("api-version", "API_VERSION")
                .header("user-agent", user_agent())
                .header("authorization", "Bearer TOKEN");
            then.status(200).json_body(json!({ "name": "RESOURCE_NAME" }));
        })
        .await;

    let named: Named = client(&server).get("RESOURCE_ID", "API_VERSION").await.unwrap();

    mock.assert_async().await;
    assert_eq!(named.name, "RESOURCE_NAME");
}

#[tokio::test]
async fn test_token_is_reused_across_requests() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/RESOURCE_ID")
                .header("authorization", "Bearer TOKEN");
            then.status(200).json_body(json!({ "name": "RESOURCE_NAME" }));
        })
        .await;

    let credential = Arc::new(StaticCredential::default());
    let client = client_with(&server, credential.clone());
    for _ in 0..5 {
        let _: Named = client.get("RESOURCE_ID", "API_VERSION").await.unwrap();
    }

    mock.assert_calls_async(5).await;
    assert_eq!(credential.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_get_not_found_carries_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).json_body(json!({
                "error": { "code": "ResourceNotFound", "message": "gone" }
            }));
        })
        .await;

    let err = client(&server)
        .get::<Named>("/missing", "2021-04-01")
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(reqwest::StatusCode::NOT_FOUND));
    match err {
        CloudError::Response(resp) => {
            assert_eq!(resp.error_code.as_deref(), Some("ResourceNotFound"));
            assert_eq!(resp.message, "gone");
        }
        other => panic!("Expected Response error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_put_tracks_async_operation_then_reads_resource() {
    let server = MockServer::start_async().await;
    let operation_url = server.url("/operations/op1");

    let put = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/apps/a1/deployments/d1")
                .json_body(json!({ "properties": { "active": true } }));
            then.status(201)
                .header("Azure-AsyncOperation", operation_url.as_str())
                .json_body(json!({ "name": "d1", "properties": { "provisioningState": "Creating" } }));
        })
        .await;
    let operation = server
        .mock_async(|when, then| {
            when.method(GET).path("/operations/op1");
            then.status(200).json_body(json!({ "status": "Succeeded" }));
        })
        .await;
    let read_back = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/apps/a1/deployments/d1")
                .query_param("api-version", "2023-12-01");
            then.status(200)
                .json_body(json!({ "name": "d1", "properties": { "provisioningState": "Succeeded" } }));
        })
        .await;

    let poller = client(&server)
        .begin_put::<Named, _>(
            "/apps/a1/deployments/d1",
            "2023-12-01",
            &json!({ "properties": { "active": true } }),
        )
        .await
        .unwrap();
    assert!(!poller.is_done());

    let result = poller.poll_until_done().await.unwrap();

    put.assert_async().await;
    operation.assert_async().await;
    read_back.assert_async().await;
    assert_eq!(result.name, "d1");
}

#[tokio::test]
async fn test_post_follows_location_headers() {
    let server = MockServer::start_async().await;
    let first = server.url("/locations/step1");
    let second = server.url("/locations/step2");

    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/vaults/kv1/purge")
                .header("content-length", "0");
            then.status(202).header("Location", first.as_str());
        })
        .await;
    let step1 = server
        .mock_async(|when, then| {
            when.method(GET).path("/locations/step1");
            then.status(202).header("Location", second.as_str());
        })
        .await;
    let step2 = server
        .mock_async(|when, then| {
            when.method(GET).path("/locations/step2");
            then.status(200).json_body(json!({ "name": "purged" }));
        })
        .await;

    let result: Named = client(&server)
        .begin_post::<Named, ()>("/vaults/kv1/purge", "2023-07-01", None)
        .await
        .unwrap()
        .poll_until_done()
        .await
        .unwrap();

    step1.assert_async().await;
    step2.assert_async().await;
    assert_eq!(result.name, "purged");
}

#[tokio::test]
async fn test_post_without_tracking_headers_is_done_immediately() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/apps/a1/setActiveDeployments");
            then.status(200).json_body(json!({ "name": "a1" }));
        })
        .await;

    let poller = client(&server)
        .begin_post::<Named, _>(
            "/apps/a1/setActiveDeployments",
            "2023-12-01",
            Some(&json!({ "activeDeploymentNames": ["d1"] })),
        )
        .await
        .unwrap();

    assert!(poller.is_done());
    assert_eq!(poller.poll_until_done().await.unwrap().name, "a1");
}

#[tokio::test]
async fn test_failed_operation_surfaces_remote_error() {
    let server = MockServer::start_async().await;
    let operation_url = server.url("/operations/op2");

    server
        .mock_async(|when, then| {
            when.method(POST).path("/vaults/kv2/purge");
            then.status(202).header("Azure-AsyncOperation", operation_url.as_str());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/operations/op2");
            then.status(200).json_body(json!({
                "status": "Failed",
                "error": { "code": "Conflict", "message": "vault is protected" }
            }));
        })
        .await;

    let err = client(&server)
        .begin_post::<(), ()>("/vaults/kv2/purge", "2023-07-01", None)
        .await
        .unwrap()
        .poll_until_done()
        .await
        .unwrap_err();

    match err {
        CloudError::OperationFailed {
            status,
            code,
            message,
        } => {
            assert_eq!(status, "Failed");
            assert_eq!(code, "Conflict");
            assert_eq!(message, "vault is protected");
        }
        other => panic!("Expected OperationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_put_with_terminal_provisioning_state_needs_no_polling() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path("/things/t1");
            then.status(200)
                .json_body(json!({ "name": "t1", "properties": { "provisioningState": "Succeeded" } }));
        })
        .await;

    let poller = client(&server)
        .begin_put::<Named, _>("/things/t1", "2023-01-01", &json!({}))
        .await
        .unwrap();

    assert!(poller.is_done());
    assert_eq!(poller.poll_until_done().await.unwrap().name, "t1");
}
