//! Svar - Context-aware reply generation for social posts
//!
//! A CLI tool that fetches a social post, gathers context with a
//! tool-augmented analysis loop, and drafts candidate replies.
//!
//! The name "Svar" comes from the Norwegian word for "reply."
//!
//! # Overview
//!
//! Svar allows you to:
//! - Fetch posts from twitter.com / x.com status URLs
//! - Describe attached images and videos with a vision model
//! - Analyze a post with tools (internet search, image analysis,
//!   webpage summarization, video analysis)
//! - Generate candidate replies and save them as a markdown report
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and prompt templates
//! - `llm` - Completion service abstraction and OpenAI backend
//! - `agent` - Tool registry and the tool-calling conversation loop
//! - `post` - Post fetching and context building
//! - `search` / `media` / `web` - Context-gathering capabilities
//! - `analysis` / `reply` - Post analysis and reply drafting
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use svar::config::Settings;
//! use svar::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let report = orchestrator
//!         .generate_replies("https://x.com/rustlang/status/1234567890")
//!         .await?;
//!     println!("Saved {} replies to {:?}", report.replies.len(), report.report_path);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod media;
pub mod openai;
pub mod orchestrator;
pub mod post;
pub mod reply;
pub mod search;
pub mod web;

pub use error::{Result, SvarError};
