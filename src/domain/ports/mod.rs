//! Domain ports (interfaces)
//!
//! Traits implemented by infrastructure adapters:
//! - `EnvironmentStore`: the merge target namespace
//! - `SecretStore` / `SecretStoreFactory`: vault listing and retrieval
//! - `ConfigStore`: paginated config store settings
//! - `TokenCredential`: bearer tokens for remote stores

pub mod config_store;
pub mod credential;
pub mod environment;
pub mod secret_store;

pub use config_store::ConfigStore;
pub use credential::TokenCredential;
pub use environment::EnvironmentStore;
pub use secret_store::{PageStream, SecretStore, SecretStoreFactory};
