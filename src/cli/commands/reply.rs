//! Reply command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the reply command: the full fetch-analyze-generate pipeline.
pub async fn run_reply(
    url: &str,
    count: Option<u8>,
    model: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Reply, &settings.search.api_key_env) {
        Output::error(&format!("{}", e));
        Output::info("Run 'svar doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if let Some(count) = count {
        settings.reply.count = count;
    }
    if let Some(model) = model {
        settings.reply.model = model;
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Fetching post and generating replies...");

    match orchestrator.generate_replies(url).await {
        Ok(report) => {
            spinner.finish_and_clear();

            Output::header("Original Post");
            println!("{}", report.post.text);
            println!("by @{}", report.post.author.screen_name);

            Output::header("Generated Replies");
            for (i, reply) in report.replies.iter().enumerate() {
                Output::reply_candidate(i + 1, reply);
            }

            println!();
            Output::success(&format!(
                "Replies saved to {}",
                report.report_path.display()
            ));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate replies: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
