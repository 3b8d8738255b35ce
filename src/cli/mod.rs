//! Command-line interface

pub mod output;
pub mod service;
pub mod types;

use anyhow::{Context, Result};

use crate::domain::ports::EnvironmentStore;
use crate::infrastructure::config::{ResolverSettings, SettingsLoader};
use crate::infrastructure::environment::{InMemoryEnvironment, ProcessEnvironment};

pub use output::{output, CommandOutput, ResolveOutput};
pub use service::build_pipeline;
pub use types::Cli;

/// Load resolver settings, applying CLI overrides
pub fn load_settings(cli: &Cli) -> Result<ResolverSettings> {
    let mut settings = SettingsLoader::load_from_file(&cli.config)?;
    if let Some(env_file) = &cli.env_file {
        settings.env_file.clone_from(env_file);
    }
    Ok(settings)
}

/// Resolve the configuration once and print it
pub async fn execute(cli: &Cli, settings: &ResolverSettings) -> Result<()> {
    let mut pipeline = build_pipeline(settings).context("Failed to set up configuration sources")?;

    let config = if cli.isolated {
        let mut env = InMemoryEnvironment::with_vars(ProcessEnvironment::new().snapshot());
        pipeline.run(&mut env).await
    } else {
        let mut env = ProcessEnvironment::new();
        pipeline.run(&mut env).await
    }
    .context("Configuration resolution failed")?;

    output(&ResolveOutput::new(settings.runtime_mode(), &config), cli.json);
    Ok(())
}

/// Print a fatal error and exit with a non-zero status
pub fn handle_error(err: &anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().map(ToString::to_string).collect();
        eprintln!(
            "{}",
            serde_json::json!({ "success": false, "error": err.to_string(), "causes": chain })
        );
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
