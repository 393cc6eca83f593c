//! Analyze command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the analyze command on a post URL or raw text.
pub async fn run_analyze(input: &str, no_tools: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Completion, &settings.search.api_key_env) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Analyzing...");

    match orchestrator.analyze_input(input, !no_tools).await {
        Ok(analysis) => {
            spinner.finish_and_clear();
            Output::header("Analysis");
            println!("{}", analysis);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Analysis failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
