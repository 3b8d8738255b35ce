//! envcascade - layered startup configuration resolution
//!
//! Resolves an application's configuration before it starts serving: a local
//! `.env` file in development, or Azure App Configuration (with Key Vault
//! references dereferenced) and optionally Azure Key Vault in production. The
//! merged environment is then read into a typed `ResolvedConfig`.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, ports and error types
//! - **Service Layer** (`services`): sources, merger, extractor, startup pipeline
//! - **Infrastructure Layer** (`infrastructure`): Azure REST adapters,
//!   environment stores, settings and logging
//! - **CLI Layer** (`cli`): the `envcascade` binary
//!
//! # Example
//!
//! ```ignore
//! use envcascade::cli::build_pipeline;
//! use envcascade::infrastructure::config::SettingsLoader;
//! use envcascade::infrastructure::environment::ProcessEnvironment;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = SettingsLoader::load()?;
//!     let mut pipeline = build_pipeline(&settings)?;
//!     let config = pipeline.run(&mut ProcessEnvironment::new()).await?;
//!     println!("{}", config.database.database_name);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::error::{EnvironmentError, ResolveError, StoreError};
pub use domain::models::{
    DatabaseConfig, ObservabilityConfig, ResolvedConfig, RuntimeMode, SourcePolicy,
};
pub use domain::ports::{ConfigStore, EnvironmentStore, SecretStore, TokenCredential};
pub use infrastructure::config::{ResolverSettings, SettingsError, SettingsLoader};
pub use services::{ConfigExtractor, SchemaExtractor, StartupPipeline, StartupState};
