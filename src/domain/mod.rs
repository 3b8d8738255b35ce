//! Domain layer for envcascade
//!
//! This module contains the configuration model, the resolution error
//! taxonomy and the ports implemented by infrastructure adapters.

pub mod error;
pub mod models;
pub mod ports;

pub use error::{EnvironmentError, ResolveError, StoreError};
