//! Resolver settings
//!
//! Hierarchical settings using figment:
//! - Programmatic defaults
//! - Optional `envcascade.yaml`
//! - `ENVCASCADE_*` overrides
//! - Well-known Azure variables (`APP_ENV`, `AZURE_*`, `IDENTITY_*`)

pub mod loader;
pub mod settings;

pub use loader::{SettingsError, SettingsLoader};
pub use settings::{IdentitySettings, RemoteSettings, ResolverSettings};
