//! Describe command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::llm::OpenAiChat;
use crate::media::ImageAnalyzer;
use anyhow::Result;
use std::sync::Arc;

/// Run the describe command on an image URL or file path.
pub async fn run_describe(image: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Completion, &settings.search.api_key_env) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let analyzer = ImageAnalyzer::new(Arc::new(OpenAiChat::new()), settings.vision, prompts);

    let spinner = Output::spinner("Analyzing image...");

    match analyzer.describe(image).await {
        Ok(description) => {
            spinner.finish_and_clear();
            Output::header("Image Description");
            println!("{}", description);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Image analysis failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
