//! `vini` command-line entry point.
//!
//! Thin wrapper around the vini library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Opens the settings file
//! 4. Runs one command and prints its output

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use vini::Settings;

use crate::cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    let settings = Settings::open(&config).context("failed to open settings")?;

    tracing::debug!(
        "Using {} (comments in {})",
        settings
            .file_path()
            .map_or_else(String::new, |p| p.display().to_string()),
        settings
            .comment_path()
            .map_or_else(String::new, |p| p.display().to_string())
    );

    for line in cli::run(&cli, &settings)? {
        println!("{line}");
    }

    Ok(())
}
