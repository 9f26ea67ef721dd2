//! Tenor server: application entry point.
//!
//! Usage:
//!   tenor -c <path-to-config.toml>

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tenor_db::DbManager;
use tenor_server::{App, ServiceConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tenor", about = "Tenor loan and credit limit service")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short = 'c', long = "config", default_value = "/etc/tenor/tenor.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tenor=info")),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!(path = %cli.config.display(), "Loading configuration");
    let config = ServiceConfig::load(&cli.config)?;
    config.verify()?;

    let db = DbManager::connect(&config.database)
        .await
        .context("failed to connect to SurrealDB")?;
    let _app = App::start(db.client(), &config).await?;

    info!("Tenor server started");
    tokio::signal::ctrl_c().await?;
    info!("Tenor server stopped");
    Ok(())
}
