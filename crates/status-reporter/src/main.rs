//! status-reporter entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use reporter_core::config::{load_env_file, load_env_files};
use status_reporter::cli::Cli;
use status_reporter::commands;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(path) = &cli.env_file {
        if let Err(e) = load_env_file(path) {
            eprintln!("Error: cannot load {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
    load_env_files();

    // RUST_LOG wins over LOG_LEVEL and -v
    let log_level = std::env::var("LOG_LEVEL").ok();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_filter(log_level.as_deref())));
    fmt().with_env_filter(filter).with_target(false).init();

    if let Err(e) = commands::execute(cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
