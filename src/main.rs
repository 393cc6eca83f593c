//! Svar CLI entry point.

use anyhow::Result;
use clap::Parser;
use svar::cli::{commands, Cli, Commands};
use svar::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("svar={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Execute command
    match &cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Reply { url, count, model } => {
            commands::run_reply(url, *count, model.clone(), settings).await?;
        }

        Commands::Analyze { input, no_tools } => {
            commands::run_analyze(input, *no_tools, settings).await?;
        }

        Commands::Search { query } => {
            commands::run_search(query, settings).await?;
        }

        Commands::Describe { image } => {
            commands::run_describe(image, settings).await?;
        }

        Commands::Summarize { url } => {
            commands::run_summarize(url, settings).await?;
        }

        Commands::Video { source } => {
            commands::run_video(source, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
