//! azdev cloud plumbing
//!
//! Everything the Azure facade in `azdev-azcli` consumes from outside:
//!
//! - per-tenant selection of `azure_identity` credentials
//! - an HTTP pipeline that stamps the azdev `User-Agent` and cached bearer tokens
//! - a Resource Manager client with typed get/post calls
//! - a long-running operation [`Poller`]
//! - [`ResponseError`], carrying the HTTP status of failed calls
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │                 azdev CLI                  │
//! └─────────────────────┬─────────────────────┘
//!                       │
//! ┌─────────────────────▼─────────────────────┐
//! │                azdev-azcli                 │
//! │  keyvault / aks / spring / func / profile  │
//! └─────────────────────┬─────────────────────┘
//!                       │
//! ┌─────────────────────▼─────────────────────┐
//! │                azdev-cloud                 │
//! │   ArmClient ─ Poller ─ Pipeline ─ Creds    │
//! └───────────────────────────────────────────┘
//! ```

pub mod arm;
pub mod credential;
pub mod error;
pub mod pipeline;
pub mod poller;
pub mod provider;

pub use arm::ArmClient;
pub use azure_core::credentials::{AccessToken, TokenCredential};
pub use azure_identity::{AzureCliCredential, ClientSecretCredential};
pub use credential::{MultiTenantCredentialProvider, TokenCache};
pub use error::{CloudError, ResponseError, Result, redact_url};
pub use pipeline::{ClientOptions, Pipeline, user_agent};
pub use poller::{Poller, header_url, parse_retry_after};
pub use provider::DefaultCredentialProvider;
