//! envcascade CLI entry point.

use clap::Parser;

use envcascade::cli::{self, Cli};
use envcascade::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match cli::load_settings(&cli) {
        Ok(settings) => settings,
        Err(err) => cli::handle_error(&err, cli.json),
    };

    let _logger = match LoggerImpl::init(&settings.logging) {
        Ok(logger) => logger,
        Err(err) => cli::handle_error(&err, cli.json),
    };

    if let Err(err) = cli::execute(&cli, &settings).await {
        cli::handle_error(&err, cli.json);
    }
}
