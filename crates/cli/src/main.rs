use std::process::ExitCode;

use engagefee_core::config::{AppConfig, LoadOptions, LogFormat};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout carries only the command payload.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(error) = installed {
        eprintln!("failed to install log subscriber: {error}");
    }
}

fn main() -> ExitCode {
    // Commands report config errors themselves; logging falls back to defaults.
    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    init_logging(&config);

    engagefee_cli::run()
}
