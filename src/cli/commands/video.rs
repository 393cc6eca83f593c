//! Video command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::llm::OpenAiChat;
use crate::media::VideoAnalyzer;
use anyhow::Result;
use std::sync::Arc;

/// Run the video command on a video URL or file path.
pub async fn run_video(source: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Video, &settings.search.api_key_env) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let temp_dir = settings.temp_dir();
    let analyzer = VideoAnalyzer::new(
        Arc::new(OpenAiChat::new()),
        settings.vision,
        temp_dir,
        prompts,
    );

    let spinner = Output::spinner("Extracting and analyzing frames...");

    match analyzer.describe(source).await {
        Ok(description) => {
            spinner.finish_and_clear();
            Output::header("Video Analysis");
            println!("{}", description);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Video analysis failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
