//! Token credential selection and caching
//!
//! Credentials themselves come from `azure_identity`; azdev only decides
//! which one serves a tenant ([`MultiTenantCredentialProvider`]) and keeps the
//! tokens it hands out until they are close to expiry ([`TokenCache`]).

use crate::error::Result;
use async_trait::async_trait;
use azure_core::credentials::{AccessToken, TokenCredential};
use azure_core::time::{Duration, OffsetDateTime};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Tokens this close to expiry are fetched again
const REFRESH_MARGIN_SECS: i64 = 300;

/// Resolves a credential for a tenant.
///
/// An empty tenant ID means the home tenant of the signed-in account.
#[async_trait]
pub trait MultiTenantCredentialProvider: Send + Sync {
    async fn get_token_credential(&self, tenant_id: &str) -> Result<Arc<dyn TokenCredential>>;
}

/// Tokens keyed by their scope set
#[derive(Debug, Default)]
pub struct TokenCache(RwLock<HashMap<Vec<String>, AccessToken>>);

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached token for `scopes`, or a fresh one from `credential`
    pub async fn get_token(
        &self,
        credential: &dyn TokenCredential,
        scopes: &[&str],
    ) -> Result<AccessToken> {
        let key: Vec<String> = scopes.iter().map(ToString::to_string).collect();

        if let Some(token) = self.0.read().await.get(&key) {
            if !needs_refresh(token) {
                return Ok(token.clone());
            }
        }

        let mut tokens = self.0.write().await;
        // another request may have refreshed it while we waited
        if let Some(token) = tokens.get(&key) {
            if !needs_refresh(token) {
                return Ok(token.clone());
            }
        }

        tracing::debug!("requesting token for {}", key.join(" "));
        let token = credential.get_token(scopes, None).await?;
        tokens.insert(key, token.clone());
        Ok(token)
    }
}

fn needs_refresh(token: &AccessToken) -> bool {
    token.expires_on <= OffsetDateTime::now_utc() + Duration::seconds(REFRESH_MARGIN_SECS)
}
