//! Domain models
//!
//! Core data structures used across the resolution pipeline.

pub mod config;
pub mod runtime;
pub mod secret;
pub mod setting;

pub use config::{DatabaseConfig, ObservabilityConfig, ResolvedConfig};
pub use runtime::{RuntimeMode, SourcePolicy};
pub use secret::{normalize_secret_name, AccessToken, SecretProperties};
pub use setting::{ConfigurationSetting, SecretReference, KEY_VAULT_REFERENCE_CONTENT_TYPE};
