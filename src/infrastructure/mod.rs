//! Infrastructure layer module
//!
//! Adapters and external integrations:
//! - Azure Key Vault and App Configuration REST clients, with credentials
//! - Environment stores (process and in-memory)
//! - In-memory remote stores
//! - Resolver settings (figment)
//! - Logging infrastructure
//!
//! Implementations satisfy the port traits defined in the domain layer.

pub mod azure;
pub mod config;
pub mod environment;
pub mod logging;
pub mod memory;
