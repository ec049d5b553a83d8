//! Signed-in user lookup and access tokens

use crate::error::{AzCliError, Result, ResultExt};
use crate::graph::{GraphClientFactory, UserProfile};
use azdev_cloud::{CloudError, MultiTenantCredentialProvider};
use azdev_config::CloudEndpoints;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AzCliAccessToken {
    pub access_token: String,
    pub expires_on: DateTime<Utc>,
}

/// Queries user profile information
#[derive(Clone)]
pub struct UserProfileService {
    credential_provider: Arc<dyn MultiTenantCredentialProvider>,
    graph_client_from_cred: GraphClientFactory,
    endpoints: CloudEndpoints,
}

impl UserProfileService {
    pub fn new(
        credential_provider: Arc<dyn MultiTenantCredentialProvider>,
        graph_client_from_cred: GraphClientFactory,
        endpoints: CloudEndpoints,
    ) -> Self {
        Self {
            credential_provider,
            graph_client_from_cred,
            endpoints,
        }
    }

    pub async fn get_signed_in_user_id(&self, tenant_id: &str) -> Result<String> {
        Ok(self.get_signed_in_user(tenant_id).await?.id)
    }

    pub async fn get_signed_in_user(&self, tenant_id: &str) -> Result<UserProfile> {
        let cred = self
            .credential_provider
            .get_token_credential(tenant_id)
            .await?;

        let graph_client =
            (self.graph_client_from_cred)(cred).context("failed creating graph client")?;

        graph_client
            .me()
            .await
            .context("failed retrieving current user profile")
    }

    /// Resource Manager token for the tenant
    pub async fn get_access_token(&self, tenant_id: &str) -> Result<AzCliAccessToken> {
        let cred = self
            .credential_provider
            .get_token_credential(tenant_id)
            .await?;

        let scope = self.endpoints.resource_manager_scope();
        let token = match cred.get_token(&[scope.as_str()], None).await {
            Ok(token) => token,
            Err(e) => {
                // the azure-cli credential passes az's stderr through in the message
                let message = e.to_string();
                if is_not_logged_in_message(&message) {
                    return Err(AzCliError::NotLoggedIn);
                } else if is_refresh_token_expired_message(&message) {
                    return Err(AzCliError::RefreshTokenExpired);
                }
                return Err(AzCliError::Context {
                    context: "failed retrieving access token".to_string(),
                    source: e.into(),
                });
            }
        };

        let expires_on = DateTime::<Utc>::from_timestamp(token.expires_on.unix_timestamp(), 0)
            .ok_or_else(|| {
                CloudError::InvalidResponse(format!(
                    "token expiry out of range: {}",
                    token.expires_on
                ))
            })?;

        Ok(AzCliAccessToken {
            access_token: token.token.secret().to_string(),
            expires_on,
        })
    }
}

fn is_not_logged_in_message(s: &str) -> bool {
    s.contains("Please run 'az login' to setup account.")
        || s.contains("Please run 'az login' to access your accounts.")
}

fn is_refresh_token_expired_message(s: &str) -> bool {
    s.contains("AADSTS70043") || s.contains("AADSTS700082")
}
