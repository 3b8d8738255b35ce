use serde::{Deserialize, Serialize};

/// Fully resolved application configuration
///
/// Always produced by the extractor, even when required fields are empty.
/// Downstream components decide whether an empty connection string is fatal
/// for them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResolvedConfig {
    /// Document database connection settings
    pub database: DatabaseConfig,

    /// Telemetry exporter settings
    pub observability: ObservabilityConfig,
}

/// Database configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Connection string (`AZURE_COSMOS_CONNECTION_STRING`)
    pub connection_string: String,

    /// Database name (`AZURE_COSMOS_DATABASE_NAME`)
    pub database_name: String,
}

/// Observability configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ObservabilityConfig {
    /// Telemetry connection string (`APPLICATIONINSIGHTS_CONNECTION_STRING`)
    pub connection_string: String,

    /// Cloud role name reported with telemetry (`APPLICATIONINSIGHTS_ROLE_NAME`)
    pub role_name: String,
}

impl ResolvedConfig {
    /// Copy of this configuration with connection strings masked for display
    pub fn redacted(&self) -> Self {
        Self {
            database: DatabaseConfig {
                connection_string: mask(&self.database.connection_string),
                database_name: self.database.database_name.clone(),
            },
            observability: ObservabilityConfig {
                connection_string: mask(&self.observability.connection_string),
                role_name: self.observability.role_name.clone(),
            },
        }
    }
}

fn mask(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}
