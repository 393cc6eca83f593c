//! Summarize command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::llm::OpenAiChat;
use crate::web::WebSummarizer;
use anyhow::Result;
use std::sync::Arc;

/// Run the summarize command on a webpage URL.
pub async fn run_summarize(url: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Completion, &settings.search.api_key_env) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let summarizer = WebSummarizer::new(Arc::new(OpenAiChat::new()), settings.web, prompts);

    let spinner = Output::spinner("Fetching and summarizing...");

    match summarizer.summarize_url(url).await {
        Ok(summary) => {
            spinner.finish_and_clear();
            Output::header("Summary");
            println!("{}", summary);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Summarization failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
