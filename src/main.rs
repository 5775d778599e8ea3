//! Standalone listener for the democracy function.
//!
//! # Architecture Overview
//!
//! ```text
//!   GET /{function}[/...]
//!        │
//!        ▼
//!   ┌─────────┐    ┌────────────┐    ┌──────────────┐    ┌──────────┐
//!   │  mount  │───▶│ dispatcher │───▶│  reference   │───▶│ decision │
//!   │ (strip) │    │ main/debug │    │ store (once) │    │  engine  │
//!   └─────────┘    └────────────┘    └──────────────┘    └────┬─────┘
//!                                                              │
//!   text/plain "Yes" | text/html page ◀──── renderer ◀─────────┘
//! ```
//!
//! Configuration comes from an optional TOML file overridden by the
//! environment: `PORT`, `FUNCTION`, `CUSTOM_DOMAIN`, `DATA_DIR`, `LOG_FORMAT`,
//! `GOOGLE_CLOUD_PROJECT`, `SLACK_TOKEN`, `SLACK_CHANNEL`, `SLACK_LEVEL`,
//! `SLACK_DEBUG`.

use clap::Parser;
use std::path::PathBuf;

use democracy_check::config::{resolve_config, ConfigOverrides};
use democracy_check::lifecycle::startup;

#[derive(Parser)]
#[command(name = "democracy-check")]
#[command(about = "Answers whether the visitor's country is a democracy", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref(), cli.overrides)?;

    startup::init_observability(&config);
    tracing::info!("democracy-check v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
