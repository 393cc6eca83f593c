//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::search::SearchClient;
use anyhow::Result;

/// Run the search command against the configured online model.
pub async fn run_search(query: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings.search.api_key_env) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let client = SearchClient::new(&settings.search, prompts);

    let spinner = Output::spinner("Searching...");

    match client.search(query).await {
        Ok(result) => {
            spinner.finish_and_clear();
            Output::header("Search Result");
            println!("{}", result);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
