//! Azure remote store adapters
//!
//! REST clients for the two remote configuration sources:
//! - Key Vault (`SecretStore`)
//! - App Configuration (`ConfigStore`)
//!
//! plus the credentials that authenticate them and the shared retry policy.

pub mod app_config;
pub mod credential;
mod http;
pub mod key_vault;
pub mod retry;
pub mod types;

pub use app_config::{AppConfigClient, APP_CONFIG_SCOPE};
pub use credential::{
    ClientSecretCredential, DefaultCredential, ManagedIdentityCredential, ManagedIdentitySource,
    StaticTokenCredential,
};
pub use http::build_http_client;
pub use key_vault::{KeyVaultClient, KeyVaultClientFactory, KEY_VAULT_SCOPE};
pub use retry::RetryPolicy;
