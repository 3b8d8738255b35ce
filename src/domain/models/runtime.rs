use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime mode of the process
///
/// Production-like processes source their configuration remotely; every other
/// mode reads a local env file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// Read remote stores, overwriting existing values
    Production,
    /// Read the local file, never overwriting
    #[default]
    Development,
}

impl RuntimeMode {
    /// Interpret the raw runtime mode flag
    ///
    /// Only `production` (case-insensitive) is production-like. Unset, empty
    /// and any other value fall back to development.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("production") => Self::Production,
            _ => Self::Development,
        }
    }

    /// Whether remote stores are consulted
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Development => write!(f, "development"),
        }
    }
}

/// Which remote sources populate the environment in production
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourcePolicy {
    /// Only the config store; vault secrets arrive through references
    #[default]
    ConfigStoreOnly,

    /// Every vault secret first, then the config store on top
    SecretStoreThenConfigStore,
}

impl SourcePolicy {
    /// Whether vault secrets are written directly before the config store
    pub const fn merges_secret_store(self) -> bool {
        matches!(self, Self::SecretStoreThenConfigStore)
    }
}
