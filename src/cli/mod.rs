//! CLI module for Svar.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Svar - Context-aware reply generation for social posts
///
/// A CLI tool that fetches a social post, gathers context with a
/// tool-augmented analysis loop, and drafts candidate replies.
/// The name "Svar" comes from the Norwegian word for "reply."
#[derive(Parser, Debug)]
#[command(name = "svar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Generate replies for a post URL (full pipeline)
    Reply {
        /// twitter.com or x.com status URL
        url: String,

        /// Number of replies to generate (overrides config)
        #[arg(short = 'n', long)]
        count: Option<u8>,

        /// LLM model for reply generation (overrides config)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Analyze a post URL or raw text without generating replies
    Analyze {
        /// Post URL or raw text to analyze
        input: String,

        /// Disable tool calls during analysis
        #[arg(long)]
        no_tools: bool,
    },

    /// Search the internet through the configured online model
    Search {
        /// Search query
        query: String,
    },

    /// Describe an image from a URL or local path
    Describe {
        /// Image URL or file path
        image: String,
    },

    /// Summarize a webpage
    Summarize {
        /// Page URL
        url: String,
    },

    /// Analyze a video by its key frames
    Video {
        /// Video URL or file path
        source: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
