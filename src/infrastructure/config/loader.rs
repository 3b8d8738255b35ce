use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use reqwest::Url;
use thiserror::Error;

use super::settings::ResolverSettings;

/// Project-local settings file, optional
pub const SETTINGS_FILE: &str = "envcascade.yaml";

/// Prefix for resolver tuning variables
pub const ENV_PREFIX: &str = "ENVCASCADE_";

/// Well-known variables read without prefix, and the settings path they fill
const WELL_KNOWN_VARS: [(&str, &str); 8] = [
    ("APP_ENV", "app_env"),
    ("AZURE_KEY_VAULT_ENDPOINT", "key_vault_endpoint"),
    ("AZURE_APP_CONFIG_ENDPOINT", "app_config_endpoint"),
    ("AZURE_CLIENT_ID", "identity.client_id"),
    ("AZURE_TENANT_ID", "identity.tenant_id"),
    ("AZURE_CLIENT_SECRET", "identity.client_secret"),
    ("IDENTITY_ENDPOINT", "identity.identity_endpoint"),
    ("IDENTITY_HEADER", "identity.identity_header"),
];

/// Settings validation errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Endpoint is not an http(s) URL with a host
    #[error("Invalid {name} endpoint '{value}': must be an http(s) URL")]
    InvalidEndpoint { name: &'static str, value: String },

    /// Remote timeout of zero
    #[error("Invalid remote timeout: {0}. Must be at least 1 second")]
    InvalidTimeout(u64),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must not exceed max_backoff_ms ({1})"
    )]
    /// Initial backoff above the maximum
    InvalidBackoff(u64, u64),

    /// Unknown log level
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Settings loader with hierarchical merging
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `envcascade.yaml` in the working directory (optional)
    /// 3. `ENVCASCADE_*` variables, nested with `__`
    /// 4. Well-known Azure variables (`APP_ENV`, `AZURE_*`, `IDENTITY_*`)
    pub fn load() -> Result<ResolverSettings> {
        Self::extract(Self::figment(SETTINGS_FILE))
    }

    /// Load settings using a specific settings file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<ResolverSettings> {
        let path = path.as_ref();
        Self::extract(Self::figment(path)).context(format!(
            "Failed to load settings from {}",
            path.display()
        ))
    }

    fn figment(file: impl AsRef<std::path::Path>) -> Figment {
        let figment = Figment::new()
            .merge(Serialized::defaults(ResolverSettings::default()))
            .merge(Yaml::file(file.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::merge_well_known(figment)
    }

    /// Merge the well-known variables as plain strings
    ///
    /// `Env` would parse `12345` or `true` into numbers and booleans, which
    /// secrets and client ids are not.
    fn merge_well_known(figment: Figment) -> Figment {
        WELL_KNOWN_VARS
            .iter()
            .filter_map(|(name, path)| std::env::var(name).ok().map(|value| (*path, value)))
            .fold(figment, |figment, (path, value)| {
                figment.merge(Serialized::default(path, value))
            })
    }

    fn extract(figment: Figment) -> Result<ResolverSettings> {
        let settings: ResolverSettings = figment
            .extract()
            .context("Failed to extract resolver settings from figment")?;
        let settings = settings.normalized();

        Self::validate(&settings)?;
        Ok(settings)
    }

    /// Validate settings after loading
    pub fn validate(settings: &ResolverSettings) -> Result<(), SettingsError> {
        validate_endpoint("key vault", settings.key_vault_endpoint.as_deref())?;
        validate_endpoint("app configuration", settings.app_config_endpoint.as_deref())?;

        if settings.remote.timeout_secs == 0 {
            return Err(SettingsError::InvalidTimeout(settings.remote.timeout_secs));
        }

        if settings.remote.initial_backoff_ms > settings.remote.max_backoff_ms {
            return Err(SettingsError::InvalidBackoff(
                settings.remote.initial_backoff_ms,
                settings.remote.max_backoff_ms,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&settings.logging.level.to_lowercase().as_str()) {
            return Err(SettingsError::InvalidLogLevel(settings.logging.level.clone()));
        }

        Ok(())
    }
}

fn validate_endpoint(name: &'static str, value: Option<&str>) -> Result<(), SettingsError> {
    let Some(value) = value else {
        return Ok(());
    };

    let valid = Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(SettingsError::InvalidEndpoint {
            name,
            value: value.to_string(),
        })
    }
}
