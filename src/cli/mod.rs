// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detect;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// BHT Detector CLI
#[derive(Parser, Debug)]
#[command(name = "bht-cli")]
#[command(version)]
#[command(about = "Check food labels for the BHT preservative (E320)", long_about = None)]
pub struct Cli {
    /// TOML configuration file (environment variables still override it)
    #[arg(long, global = true, env = "BHT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan ingredient text
    Text(detect::TextArgs),

    /// OCR a label photo and scan the extracted text
    Image(detect::ImageArgs),

    /// Show which OCR engines are available
    Engines,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let config = crate::config::DetectorConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Text(args) => detect::run_text(args, &config),
        Commands::Image(args) => detect::run_image(args, &config).await,
        Commands::Engines => detect::list_engines(&config).await,
    }
}
