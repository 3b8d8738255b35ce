//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber. Events go to
//! stderr so stdout stays free for the resolved configuration, with an
//! optional rolling JSON file alongside.

pub mod config;
pub mod logger;

pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::LoggerImpl;
