//! Shared HTTP pipeline
//!
//! Wraps a pooled [`reqwest::Client`] with the azdev user agent, cached
//! bearer tokens and translation of non-success responses into
//! [`ResponseError`].

use crate::credential::TokenCache;
use crate::error::{CloudError, ResponseError, Result, redact_url};
use azure_core::credentials::TokenCredential;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_POLL_FREQUENCY: Duration = Duration::from_secs(30);

/// `azdev/<version> (<os>; <arch>)`, followed by `AZURE_DEV_USER_AGENT` when set
pub fn user_agent() -> String {
    let mut ua = format!(
        "azdev/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    if let Ok(extra) = std::env::var("AZURE_DEV_USER_AGENT") {
        let extra = extra.trim();
        if !extra.is_empty() {
            ua.push(' ');
            ua.push_str(extra);
        }
    }
    ua
}

/// Options shared by every client built on the pipeline
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub user_agent: String,

    /// Delay between long-running operation polls when the service sends no `Retry-After`
    pub poll_frequency: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: user_agent(),
            poll_frequency: DEFAULT_POLL_FREQUENCY,
        }
    }
}

/// Authenticated request sender
#[derive(Clone)]
pub struct Pipeline {
    http: reqwest::Client,
    credential: Option<Arc<dyn TokenCredential>>,
    tokens: Arc<TokenCache>,
    scopes: Arc<Vec<String>>,
    options: Arc<ClientOptions>,
}

impl Pipeline {
    pub fn new(
        credential: Arc<dyn TokenCredential>,
        scopes: Vec<String>,
        options: ClientOptions,
    ) -> Result<Self> {
        let http = build_http_client(&options)?;
        Ok(Self {
            http,
            credential: Some(credential),
            tokens: Arc::new(TokenCache::new()),
            scopes: Arc::new(scopes),
            options: Arc::new(options),
        })
    }

    /// Same connection pool, credential and token cache, different token scopes
    pub fn with_scopes(&self, scopes: Vec<String>) -> Self {
        Self {
            scopes: Arc::new(scopes),
            ..self.clone()
        }
    }

    /// Same connection pool, no credential, for pre-signed (SAS) URLs
    pub fn without_credential(&self) -> Self {
        Self {
            credential: None,
            scopes: Arc::new(Vec::new()),
            ..self.clone()
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn request(&self, method: Method, url: impl reqwest::IntoUrl) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Send a request, failing with [`ResponseError`] on non-2xx statuses
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let builder = match &self.credential {
            Some(credential) => {
                let scopes: Vec<&str> = self.scopes.iter().map(String::as_str).collect();
                let token = self.tokens.get_token(credential.as_ref(), &scopes).await?;
                builder.bearer_auth(token.token.secret())
            }
            None => builder,
        };

        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!("{} {}", method, redact_url(url.as_str()));

        let response = self.http.execute(request).await?;
        let status = response.status();
        tracing::debug!("{} {} -> {}", method, redact_url(url.as_str()), status);

        if !status.is_success() {
            let body = response.bytes().await?;
            return Err(ResponseError::from_body(status, method.as_str(), url.as_str(), &body).into());
        }

        Ok(response)
    }

    /// [`Pipeline::send`] and decode the JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let body = response.bytes().await?;
        decode_body(&body)
    }
}

fn build_http_client(options: &ClientOptions) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(options.user_agent.clone())
        .build()
        .map_err(CloudError::from)
}

/// Decode a JSON body; an empty body decodes as `null` so `()` works for no-content results
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"null")?);
    }
    Ok(serde_json::from_slice(body)?)
}
