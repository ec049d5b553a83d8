//! Transport and credential error types

use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Errors raised below the facade layer
#[derive(Error, Debug)]
pub enum CloudError {
    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error("Authentication failed: {0}")]
    Credential(#[from] azure_core::Error),

    #[error("Long-running operation failed ({status}): {code}: {message}")]
    OperationFailed {
        status: String,
        code: String,
        message: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// HTTP status of the failed response, when there was one
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            CloudError::Response(err) => Some(err.status),
            CloudError::Http(err) => err.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

/// A non-success HTTP response
#[derive(Debug, Clone)]
pub struct ResponseError {
    pub status: StatusCode,
    pub error_code: Option<String>,
    pub message: String,
    pub method: String,
    pub url: String,
}

impl ResponseError {
    /// Build from a status and raw body, reading the
    /// `{"error":{"code","message"}}` envelope when present.
    pub fn from_body(status: StatusCode, method: &str, url: &str, body: &[u8]) -> Self {
        let envelope = serde_json::from_slice::<ErrorEnvelope>(body).ok();
        let (error_code, message) = match envelope.and_then(|e| e.error) {
            Some(detail) => (detail.code, detail.message.unwrap_or_default()),
            None => (None, String::from_utf8_lossy(body).trim().to_string()),
        };

        Self {
            status,
            error_code,
            message,
            method: method.to_string(),
            url: redact_url(url).to_string(),
        }
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.method, self.url, self.status)?;
        if let Some(code) = &self.error_code {
            write!(f, " ({})", code)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ResponseError {}

/// URL without its query string, for logs and error messages.
///
/// SAS URLs carry their signature in the query.
pub fn redact_url(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    pub(crate) code: Option<String>,
    pub(crate) message: Option<String>,
}
