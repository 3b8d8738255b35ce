//! Typed extraction of the resolved configuration from the environment

use figment::providers::Serialized;
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::models::{DatabaseConfig, ObservabilityConfig, ResolvedConfig};
use crate::domain::ports::EnvironmentStore;

/// Database connection string variable
pub const DATABASE_CONNECTION_STRING_VAR: &str = "AZURE_COSMOS_CONNECTION_STRING";
/// Database name variable
pub const DATABASE_NAME_VAR: &str = "AZURE_COSMOS_DATABASE_NAME";
/// Telemetry connection string variable
pub const OBSERVABILITY_CONNECTION_STRING_VAR: &str = "APPLICATIONINSIGHTS_CONNECTION_STRING";
/// Telemetry role name variable
pub const OBSERVABILITY_ROLE_NAME_VAR: &str = "APPLICATIONINSIGHTS_ROLE_NAME";

/// Reads the populated environment into a `ResolvedConfig`
pub trait ConfigExtractor: Send + Sync {
    /// Never fails; missing values come back empty
    fn extract(&self, env: &dyn EnvironmentStore) -> ResolvedConfig;
}

/// Flat view of the environment variables the schema reads
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct EnvSchema {
    #[serde(rename = "AZURE_COSMOS_CONNECTION_STRING")]
    database_connection_string: String,
    #[serde(rename = "AZURE_COSMOS_DATABASE_NAME")]
    database_name: String,
    #[serde(rename = "APPLICATIONINSIGHTS_CONNECTION_STRING")]
    observability_connection_string: String,
    #[serde(rename = "APPLICATIONINSIGHTS_ROLE_NAME")]
    observability_role_name: String,
}

impl From<EnvSchema> for ResolvedConfig {
    fn from(schema: EnvSchema) -> Self {
        Self {
            database: DatabaseConfig {
                connection_string: schema.database_connection_string,
                database_name: schema.database_name,
            },
            observability: ObservabilityConfig {
                connection_string: schema.observability_connection_string,
                role_name: schema.observability_role_name,
            },
        }
    }
}

/// Figment-backed extractor over a snapshot of the environment
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaExtractor;

impl SchemaExtractor {
    /// Extractor for the default schema
    pub const fn new() -> Self {
        Self
    }
}

impl ConfigExtractor for SchemaExtractor {
    fn extract(&self, env: &dyn EnvironmentStore) -> ResolvedConfig {
        let schema: EnvSchema = Figment::new()
            .merge(Serialized::defaults(EnvSchema::default()))
            .merge(Serialized::defaults(env.snapshot()))
            .extract()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not read configuration from the environment, using empty values");
                EnvSchema::default()
            });

        let config = ResolvedConfig::from(schema);
        for variable in missing_required(&config) {
            warn!(variable, "{variable} is empty or not set");
        }
        config
    }
}

/// Required variables whose value is empty in `config`
pub fn missing_required(config: &ResolvedConfig) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if config.database.connection_string.trim().is_empty() {
        missing.push(DATABASE_CONNECTION_STRING_VAR);
    }
    if config.observability.connection_string.trim().is_empty() {
        missing.push(OBSERVABILITY_CONNECTION_STRING_VAR);
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::environment::InMemoryEnvironment;

    #[test]
    fn test_extracts_all_fields() {
        let env = InMemoryEnvironment::with_vars([
            (DATABASE_CONNECTION_STRING_VAR, "AccountEndpoint=https://db/;AccountKey=k"),
            (DATABASE_NAME_VAR, "Todo"),
            (OBSERVABILITY_CONNECTION_STRING_VAR, "InstrumentationKey=abc"),
            (OBSERVABILITY_ROLE_NAME_VAR, "api"),
            ("UNRELATED", "ignored"),
        ]);

        let config = SchemaExtractor::new().extract(&env);

        assert_eq!(config.database.database_name, "Todo");
        assert_eq!(config.observability.role_name, "api");
        assert_eq!(
            config.database.connection_string,
            "AccountEndpoint=https://db/;AccountKey=k"
        );
        assert!(missing_required(&config).is_empty());
    }

    #[test]
    fn test_missing_values_come_back_empty() {
        let env = InMemoryEnvironment::with_vars([(DATABASE_NAME_VAR, "Todo")]);

        let config = SchemaExtractor::new().extract(&env);

        assert_eq!(config.database.connection_string, "");
        assert_eq!(config.observability.connection_string, "");
        assert_eq!(
            missing_required(&config),
            vec![
                DATABASE_CONNECTION_STRING_VAR,
                OBSERVABILITY_CONNECTION_STRING_VAR
            ]
        );
    }

    #[test]
    fn test_empty_connection_string_is_reported() {
        let env = InMemoryEnvironment::with_vars([
            (DATABASE_CONNECTION_STRING_VAR, ""),
            (OBSERVABILITY_CONNECTION_STRING_VAR, "InstrumentationKey=abc"),
        ]);

        let config = SchemaExtractor::new().extract(&env);

        assert_eq!(config.database.connection_string, "");
        assert_eq!(missing_required(&config), vec![DATABASE_CONNECTION_STRING_VAR]);
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let env = InMemoryEnvironment::with_vars([("azure_cosmos_database_name", "lower")]);
        let config = SchemaExtractor::new().extract(&env);
        assert_eq!(config.database.database_name, "");
    }
}
