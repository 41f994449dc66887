use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod core;
mod error;

use cli::Cli;
use core::Engine;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG overrides the verbosity flag
    let default_directive = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .init();

    info!("Starting depgraph v{}", env!("CARGO_PKG_VERSION"));

    // Create the core engine with configuration
    let engine = Engine::new(cli.config.as_deref()).await?;

    // Execute the requested command
    cli.execute(engine).await
}
