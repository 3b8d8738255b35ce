//! CLI type definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "envcascade")]
#[command(
    about = "Resolve startup configuration from a local env file, Azure App Configuration and Azure Key Vault",
    long_about = None
)]
/// Command-line arguments
#[command(version)]
pub struct Cli {
    /// Output in JSON format
    #[arg(short, long)]
    pub json: bool,

    /// Resolver settings file
    #[arg(short, long, value_name = "PATH", default_value = "envcascade.yaml")]
    pub config: PathBuf,

    /// Local env file read outside production (overrides the settings)
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Resolve into an in-memory copy of the process environment
    #[arg(long)]
    pub isolated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "envcascade",
            "--json",
            "--env-file",
            "config/dev.env",
            "--isolated",
        ])
        .unwrap();

        assert!(cli.json);
        assert!(cli.isolated);
        assert_eq!(cli.env_file, Some(PathBuf::from("config/dev.env")));
        assert_eq!(cli.config, PathBuf::from("envcascade.yaml"));
    }
}
