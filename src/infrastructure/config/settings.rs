use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::models::{RuntimeMode, SourcePolicy};
use crate::infrastructure::azure::RetryPolicy;
use crate::infrastructure::logging::LogConfig;

/// Bootstrap settings that drive the resolution pipeline itself
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResolverSettings {
    /// Raw runtime mode flag (`APP_ENV`)
    #[serde(default)]
    pub app_env: Option<String>,

    /// Key Vault endpoint (`AZURE_KEY_VAULT_ENDPOINT`)
    #[serde(default)]
    pub key_vault_endpoint: Option<String>,

    /// App Configuration endpoint (`AZURE_APP_CONFIG_ENDPOINT`)
    #[serde(default)]
    pub app_config_endpoint: Option<String>,

    /// Identity used to authenticate against both stores
    #[serde(default)]
    pub identity: IdentitySettings,

    /// Local env file read outside production
    #[serde(default = "default_env_file")]
    pub env_file: PathBuf,

    /// Whether the vault is merged directly before the config store
    #[serde(default)]
    pub source_policy: SourcePolicy,

    /// Optional App Configuration label filter
    #[serde(default)]
    pub label: Option<String>,

    /// Timeout and retry policy for remote calls
    #[serde(default)]
    pub remote: RemoteSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LogConfig,
}

fn default_env_file() -> PathBuf {
    PathBuf::from(".env")
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            app_env: None,
            key_vault_endpoint: None,
            app_config_endpoint: None,
            identity: IdentitySettings::default(),
            env_file: default_env_file(),
            source_policy: SourcePolicy::default(),
            label: None,
            remote: RemoteSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl ResolverSettings {
    /// Runtime mode derived from `app_env`
    pub fn runtime_mode(&self) -> RuntimeMode {
        RuntimeMode::from_flag(self.app_env.as_deref())
    }

    /// Convert empty strings into `None` so "set but empty" means unset
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.key_vault_endpoint = non_empty(self.key_vault_endpoint);
        self.app_config_endpoint = non_empty(self.app_config_endpoint);
        self.label = non_empty(self.label);
        self.identity = self.identity.normalized();
        self
    }
}

/// Credential inputs
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct IdentitySettings {
    /// Client id (`AZURE_CLIENT_ID`); selects a user-assigned managed identity
    #[serde(default)]
    pub client_id: Option<String>,

    /// Tenant id (`AZURE_TENANT_ID`), service principal only
    #[serde(default)]
    pub tenant_id: Option<String>,

    /// Client secret (`AZURE_CLIENT_SECRET`), service principal only
    #[serde(default, skip_serializing)]
    pub client_secret: Option<String>,

    /// App Service identity endpoint (`IDENTITY_ENDPOINT`)
    #[serde(default)]
    pub identity_endpoint: Option<String>,

    /// App Service identity header (`IDENTITY_HEADER`)
    #[serde(default, skip_serializing)]
    pub identity_header: Option<String>,
}

impl IdentitySettings {
    /// Convert empty strings into `None`
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            client_id: non_empty(self.client_id),
            tenant_id: non_empty(self.tenant_id),
            client_secret: non_empty(self.client_secret),
            identity_endpoint: non_empty(self.identity_endpoint),
            identity_header: non_empty(self.identity_header),
        }
    }
}

/// Remote call policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct RemoteSettings {
    /// Upper bound for each remote call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for throttled or failed (5xx) calls
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    500
}

const fn default_max_backoff_ms() -> u64 {
    8_000
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RemoteSettings {
    /// Per-call timeout
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Retry policy for the remote clients
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            self.initial_backoff_ms,
            self.max_backoff_ms,
            self.timeout(),
        )
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
