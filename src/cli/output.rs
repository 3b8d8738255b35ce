//! Output formatting for the CLI

use serde::Serialize;

use crate::domain::models::{ResolvedConfig, RuntimeMode};
use crate::services::missing_required;

/// Result of a command that can render itself for people or as JSON
pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

/// Print `result` to stdout in the selected format
pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Resolved configuration with connection strings masked
#[derive(Debug, Serialize)]
pub struct ResolveOutput {
    /// Runtime mode the configuration was resolved in
    pub mode: String,
    /// Resolved configuration with connection strings masked
    pub config: ResolvedConfig,
    /// Required variables that resolved to an empty value
    pub missing: Vec<&'static str>,
}

impl ResolveOutput {
    /// Build the output, masking secrets in `config`
    pub fn new(mode: RuntimeMode, config: &ResolvedConfig) -> Self {
        Self {
            mode: mode.to_string(),
            missing: missing_required(config),
            config: config.redacted(),
        }
    }
}

impl CommandOutput for ResolveOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Configuration resolved ({})", self.mode),
            "\nDatabase:".to_string(),
            format!("  connection_string: {}", display(&self.config.database.connection_string)),
            format!("  database_name:     {}", display(&self.config.database.database_name)),
            "\nObservability:".to_string(),
            format!(
                "  connection_string: {}",
                display(&self.config.observability.connection_string)
            ),
            format!("  role_name:         {}", display(&self.config.observability.role_name)),
        ];
        if !self.missing.is_empty() {
            lines.push("\nMissing:".to_string());
            for variable in &self.missing {
                lines.push(format!("  - {variable}"));
            }
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn display(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{DatabaseConfig, ObservabilityConfig};

    fn config() -> ResolvedConfig {
        ResolvedConfig {
            database: DatabaseConfig {
                connection_string: "AccountEndpoint=https://db/;AccountKey=secret".into(),
                database_name: "Todo".into(),
            },
            observability: ObservabilityConfig::default(),
        }
    }

    #[test]
    fn test_human_output_masks_connection_strings() {
        let output = ResolveOutput::new(RuntimeMode::Production, &config());
        let text = output.to_human();

        assert!(text.contains("Todo"));
        assert!(!text.contains("AccountKey"));
        assert!(text.contains("APPLICATIONINSIGHTS_CONNECTION_STRING"));
    }

    #[test]
    fn test_json_output_masks_connection_strings() {
        let json = ResolveOutput::new(RuntimeMode::Development, &config()).to_json();

        assert_eq!(json["mode"], "development");
        assert_eq!(json["config"]["database"]["database_name"], "Todo");
        assert_ne!(
            json["config"]["database"]["connection_string"],
            "AccountEndpoint=https://db/;AccountKey=secret"
        );
        assert_eq!(json["missing"][0], "APPLICATIONINSIGHTS_CONNECTION_STRING");
    }
}
