//! Long-running operation poller
//!
//! Follows the Resource Manager async operation protocol. The tracking
//! header `Azure-AsyncOperation` (or `Operation-Location`) wins over
//! `Location`, which wins over the resource body's `provisioningState`.

use crate::error::{CloudError, ErrorDetail, Result};
use crate::pipeline::{Pipeline, decode_body};
use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::time::{Duration, Instant};
use url::Url;

const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";
const OPERATION_LOCATION: &str = "operation-location";

#[derive(Debug, Clone)]
enum PollState {
    Done(Vec<u8>),
    AsyncOperation {
        operation_url: Url,
        location: Option<Url>,
    },
    Location(Url),
    ProvisioningState,
}

#[derive(Debug, PartialEq, Eq)]
enum Progress {
    InProgress,
    Succeeded,
    Failed,
}

impl Progress {
    fn from_status(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "succeeded" => Progress::Succeeded,
            "failed" | "canceled" | "cancelled" => Progress::Failed,
            _ => Progress::InProgress,
        }
    }
}

/// Handle to a server-side operation started by a PUT/POST
pub struct Poller<T> {
    pipeline: Pipeline,
    method: Method,
    resource_url: Url,
    state: PollState,
    frequency: Duration,
    retry_after: Option<Duration>,
    _result: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Poller<T> {
    /// Inspect the initial response and decide how to track the operation
    pub async fn from_response(
        pipeline: Pipeline,
        method: Method,
        resource_url: Url,
        response: Response,
    ) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let retry_after = parse_retry_after(&headers);
        let location = header_url(&headers, LOCATION.as_str(), &resource_url)?;
        let operation_url = match header_url(&headers, AZURE_ASYNC_OPERATION, &resource_url)? {
            Some(url) => Some(url),
            None => header_url(&headers, OPERATION_LOCATION, &resource_url)?,
        };
        let body = response.bytes().await?.to_vec();

        let state = if let Some(operation_url) = operation_url {
            PollState::AsyncOperation {
                operation_url,
                location,
            }
        } else if let Some(location) = location.filter(|_| status == StatusCode::ACCEPTED) {
            PollState::Location(location)
        } else if is_put_or_patch(&method) {
            match provisioning_state(&body) {
                Some(state) => match Progress::from_status(&state) {
                    Progress::Succeeded => PollState::Done(body),
                    Progress::Failed => return Err(provisioning_failed(state)),
                    Progress::InProgress => PollState::ProvisioningState,
                },
                None if status == StatusCode::CREATED => PollState::ProvisioningState,
                None => PollState::Done(body),
            }
        } else {
            PollState::Done(body)
        };

        let frequency = pipeline.options().poll_frequency;
        Ok(Self {
            pipeline,
            method,
            resource_url,
            state,
            frequency,
            retry_after,
            _result: PhantomData,
        })
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, PollState::Done(_))
    }

    /// Poll until the operation reaches a terminal state and decode its result
    pub async fn poll_until_done(mut self) -> Result<T> {
        let started = Instant::now();
        loop {
            if let PollState::Done(body) = &self.state {
                tracing::info!(
                    "{} {} completed in {:.1}s",
                    self.method,
                    self.resource_url.path(),
                    started.elapsed().as_secs_f64()
                );
                return decode_body(body);
            }

            tokio::time::sleep(self.retry_after.unwrap_or(self.frequency)).await;
            self.poll().await?;
        }
    }

    async fn poll(&mut self) -> Result<()> {
        match self.state.clone() {
            PollState::Done(_) => {}
            PollState::AsyncOperation {
                operation_url,
                location,
            } => {
                let response = self.get(operation_url).await?;
                let body = response.bytes().await?;
                let operation: OperationStatus = serde_json::from_slice(&body)?;
                tracing::debug!("operation status: {}", operation.status);

                match Progress::from_status(&operation.status) {
                    Progress::InProgress => {}
                    Progress::Failed => return Err(operation_failed(operation)),
                    Progress::Succeeded => {
                        let body = self.final_result(location).await?;
                        self.state = PollState::Done(body);
                    }
                }
            }
            PollState::Location(url) => {
                let response = self.get(url.clone()).await?;
                if response.status() == StatusCode::ACCEPTED {
                    if let Some(next) = header_url(response.headers(), LOCATION.as_str(), &url)? {
                        self.state = PollState::Location(next);
                    }
                } else if is_put_or_patch(&self.method) {
                    let body = self.final_result(None).await?;
                    self.state = PollState::Done(body);
                } else {
                    let body = response.bytes().await?.to_vec();
                    self.state = PollState::Done(body);
                }
            }
            PollState::ProvisioningState => {
                let response = self.get(self.resource_url.clone()).await?;
                let body = response.bytes().await?.to_vec();
                let state = provisioning_state(&body).unwrap_or_else(|| "Succeeded".to_string());
                match Progress::from_status(&state) {
                    Progress::InProgress => {}
                    Progress::Failed => return Err(provisioning_failed(state)),
                    Progress::Succeeded => self.state = PollState::Done(body),
                }
            }
        }
        Ok(())
    }

    /// PUT/PATCH read the resource back; POST returns whatever `Location` points at
    async fn final_result(&mut self, location: Option<Url>) -> Result<Vec<u8>> {
        let url = if is_put_or_patch(&self.method) {
            Some(self.resource_url.clone())
        } else {
            location
        };

        match url {
            Some(url) => Ok(self.get(url).await?.bytes().await?.to_vec()),
            None => Ok(Vec::new()),
        }
    }

    async fn get(&mut self, url: Url) -> Result<Response> {
        let response = self
            .pipeline
            .send(self.pipeline.request(Method::GET, url))
            .await?;
        self.retry_after = parse_retry_after(response.headers());
        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    status: String,
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ProvisioningBody {
    properties: Option<ProvisioningProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProvisioningProperties {
    provisioning_state: Option<String>,
}

fn provisioning_state(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ProvisioningBody>(body)
        .ok()
        .and_then(|b| b.properties)
        .and_then(|p| p.provisioning_state)
}

fn operation_failed(operation: OperationStatus) -> CloudError {
    let (code, message) = match operation.error {
        Some(detail) => (
            detail.code.unwrap_or_else(|| "Unknown".to_string()),
            detail.message.unwrap_or_default(),
        ),
        None => ("Unknown".to_string(), String::new()),
    };
    CloudError::OperationFailed {
        status: operation.status,
        code,
        message,
    }
}

fn provisioning_failed(state: String) -> CloudError {
    CloudError::OperationFailed {
        message: format!("resource provisioning state is {}", state),
        status: state,
        code: "ProvisioningFailed".to_string(),
    }
}

fn is_put_or_patch(method: &Method) -> bool {
    *method == Method::PUT || *method == Method::PATCH
}

/// Header value resolved against `base`; absent or empty headers are `None`
pub fn header_url(headers: &HeaderMap, name: &str, base: &Url) -> Result<Option<Url>> {
    match headers.get(name).and_then(|v| v.to_str().ok()) {
        Some(value) if !value.is_empty() => Ok(Some(base.join(value)?)),
        _ => Ok(None),
    }
}

/// `Retry-After` in delta-seconds form
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_from_status() {
        assert_eq!(Progress::from_status("Succeeded"), Progress::Succeeded);
        assert_eq!(Progress::from_status("Canceled"), Progress::Failed);
        assert_eq!(Progress::from_status("FAILED"), Progress::Failed);
        assert_eq!(Progress::from_status("Running"), Progress::InProgress);
        assert_eq!(Progress::from_status("Updating"), Progress::InProgress);
    }

    #[test]
    fn test_provisioning_state() {
        let body = br#"{"name":"d","properties":{"provisioningState":"Updating"}}"#;
        assert_eq!(provisioning_state(body).as_deref(), Some("Updating"));
        assert_eq!(provisioning_state(b"{}"), None);
        assert_eq!(provisioning_state(b""), None);
    }

    #[test]
    fn test_header_url_resolves_relative() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, "/operations/1?api-version=2".parse().unwrap());
        let base = Url::parse("https://management.azure.com/subscriptions/s/x").unwrap();

        let url = header_url(&headers, LOCATION.as_str(), &base).unwrap().unwrap();
        assert_eq!(url.as_str(), "https://management.azure.com/operations/1?api-version=2");
    }

    #[test]
    fn test_parse_retry_after_seconds_only() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, "7".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(7)));

        headers.insert(RETRY_AFTER, "Wed, 21 Oct 2015 07:28:00 GMT".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), None);
    }
}
