//! opwatch - Azure Service Management operation toolkit
//!
//! CLI entry point for polling long-running operations, mutating resources,
//! and uploading packages with rollback on failure.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use opwatch::cli::{Cli, Commands};
use opwatch::config;
use opwatch::error::Result;

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Error: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("Starting opwatch");

    // Config commands must work before any settings exist, and `wait` takes
    // an absolute URL so it does not need a configured service URL either.
    let config = match &cli.command {
        Commands::Config { .. } | Commands::Wait { .. } => {
            config::load_config_unvalidated().await?
        }
        _ => config::load_config().await?,
    };

    cli.execute(config).await?;

    Ok(())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "opwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
