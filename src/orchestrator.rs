//! Pipeline orchestrator for Svar.
//!
//! Coordinates the entire process from post fetch to the written reply report.

use crate::agent::builtin_registry;
use crate::analysis::PostAnalyzer;
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::llm::{ChatCompletion, OpenAiChat};
use crate::media::{ImageAnalyzer, VideoAnalyzer};
use crate::post::{MediaKind, Post, PostFetcher};
use crate::reply::ReplyGenerator;
use crate::search::SearchClient;
use crate::web::WebSummarizer;
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of a full reply-generation run.
#[derive(Debug)]
pub struct ReplyReport {
    /// The fetched post.
    pub post: Post,
    /// Markdown context block the analysis ran on.
    pub post_context: String,
    /// Analysis of the post.
    pub analysis: String,
    /// Candidate replies.
    pub replies: Vec<String>,
    /// Descriptions of the post's media, in attachment order.
    pub media_descriptions: Vec<String>,
    /// Where the markdown report was written.
    pub report_path: PathBuf,
}

/// The main orchestrator for the Svar pipeline.
pub struct Orchestrator {
    settings: Settings,
    fetcher: PostFetcher,
    analyzer: PostAnalyzer,
    generator: ReplyGenerator,
    images: Arc<ImageAnalyzer>,
    videos: Arc<VideoAnalyzer>,
}

impl Orchestrator {
    /// Create a new orchestrator with default backends.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let chat: Arc<dyn ChatCompletion> = Arc::new(OpenAiChat::new());
        Self::with_backend(settings, prompts, chat)
    }

    /// Create an orchestrator over an existing completion backend.
    ///
    /// The search tool still goes to its own configured endpoint.
    pub fn with_backend(
        settings: Settings,
        prompts: Prompts,
        chat: Arc<dyn ChatCompletion>,
    ) -> Result<Self> {
        let temp_dir = settings.temp_dir();
        std::fs::create_dir_all(&temp_dir)?;

        let search = Arc::new(SearchClient::new(&settings.search, prompts.clone()));
        let images = Arc::new(ImageAnalyzer::new(
            chat.clone(),
            settings.vision.clone(),
            prompts.clone(),
        ));
        let web = Arc::new(WebSummarizer::new(
            chat.clone(),
            settings.web.clone(),
            prompts.clone(),
        ));
        let videos = Arc::new(VideoAnalyzer::new(
            chat.clone(),
            settings.vision.clone(),
            temp_dir,
            prompts.clone(),
        ));

        let registry = builtin_registry(search, images.clone(), web, videos.clone());
        let analyzer = PostAnalyzer::new(
            chat.clone(),
            registry,
            settings.analysis.clone(),
            prompts.clone(),
        );
        let generator = ReplyGenerator::new(chat, settings.reply.clone(), prompts);
        let fetcher = PostFetcher::new(&settings.post.api_base);

        Ok(Self {
            settings,
            fetcher,
            analyzer,
            generator,
            images,
            videos,
        })
    }

    /// Run the full pipeline for a post URL and write the markdown report.
    #[instrument(skip(self))]
    pub async fn generate_replies(&self, url: &str) -> Result<ReplyReport> {
        let post = self.fetcher.fetch(url).await?;
        info!("Fetched post by @{}", post.author.screen_name);

        let media_descriptions = self.describe_media(&post).await;
        let post_context = post.context_markdown(&media_descriptions);

        let analysis = self.analyzer.analyze(&post_context).await?;
        info!(
            "Analysis done in {} iteration(s), {} tool call(s)",
            analysis.iterations,
            analysis.tool_calls.len()
        );

        let replies = self.generator.generate(&post.text, &analysis.content).await?;

        let report_path = self.write_report(
            &post,
            &post_context,
            &analysis.content,
            &replies,
            &media_descriptions,
        )?;
        info!("Report written to {:?}", report_path);

        Ok(ReplyReport {
            post,
            post_context,
            analysis: analysis.content,
            replies,
            media_descriptions,
            report_path,
        })
    }

    /// Analyze a post URL or raw text without generating replies.
    ///
    /// URLs are fetched and expanded into a full context block (including
    /// media descriptions); anything else is analyzed as-is.
    #[instrument(skip(self))]
    pub async fn analyze_input(&self, input: &str, use_tools: bool) -> Result<String> {
        let context = if crate::post::parse_post_url(input).is_ok() {
            let post = self.fetcher.fetch(input).await?;
            let media_descriptions = self.describe_media(&post).await;
            post.context_markdown(&media_descriptions)
        } else {
            input.to_string()
        };

        if use_tools {
            Ok(self.analyzer.analyze(&context).await?.content)
        } else {
            self.analyzer.analyze_plain(&context).await
        }
    }

    /// Describe each media item attached to the post.
    ///
    /// A failed description is logged and skipped rather than aborting the
    /// run; replies can still be drafted from the text alone.
    async fn describe_media(&self, post: &Post) -> Vec<String> {
        let items = post.media_items();
        if items.is_empty() {
            info!("No media found in post");
            return Vec::new();
        }

        let mut descriptions = Vec::new();
        for item in items {
            let result = match item.kind {
                MediaKind::Photo => self.images.describe(&item.url).await,
                MediaKind::Video | MediaKind::Gif => self.videos.describe(&item.url).await,
            };
            match result {
                Ok(description) => descriptions.push(description),
                Err(e) => warn!("Skipping media {}: {}", item.url, e),
            }
        }
        descriptions
    }

    /// Write the timestamped markdown report into the output directory.
    fn write_report(
        &self,
        post: &Post,
        post_context: &str,
        analysis: &str,
        replies: &[String],
        media_descriptions: &[String],
    ) -> Result<PathBuf> {
        let output_dir = self.settings.output_dir();
        std::fs::create_dir_all(&output_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
        let path = output_dir.join(format!("generated_replies_{}.md", timestamp));

        let content = render_report(post, post_context, analysis, replies, media_descriptions);
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

/// Render the markdown reply report.
fn render_report(
    post: &Post,
    post_context: &str,
    analysis: &str,
    replies: &[String],
    media_descriptions: &[String],
) -> String {
    let mut report = String::from("# Generated Replies\n\n");

    report.push_str("## Original Post\n\n");
    report.push_str(&format!("{}\n\n", post.text));
    report.push_str(&format!("by @{}\n\n", post.author.screen_name));

    report.push_str("## Generated Replies\n\n");
    for (i, reply) in replies.iter().enumerate() {
        report.push_str(&format!("{}. {}\n\n", i + 1, reply));
    }

    report.push_str("## Post Analysis\n\n");
    report.push_str(&format!("{}\n\n", analysis));

    report.push_str("## Post Context\n\n");
    report.push_str(&format!("{}\n\n", post_context));

    if !media_descriptions.is_empty() {
        report.push_str("## Media Descriptions\n\n");
        for desc in media_descriptions {
            report.push_str(&format!("- {}\n", desc));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::Author;

    fn sample_post() -> Post {
        Post {
            text: "Shipping day!".to_string(),
            author: Author {
                name: "Alice".to_string(),
                screen_name: "alice".to_string(),
                avatar_url: None,
                banner_url: None,
            },
            media: None,
            quote: None,
        }
    }

    #[test]
    fn test_report_sections_and_numbering() {
        let post = sample_post();
        let replies = vec!["Congrats!".to_string(), "Nice work".to_string()];
        let report = render_report(
            &post,
            "## Post Text\n\nShipping day!",
            "positive, product launch",
            &replies,
            &["screenshot of a dashboard".to_string()],
        );

        assert!(report.starts_with("# Generated Replies"));
        assert!(report.contains("by @alice"));
        assert!(report.contains("1. Congrats!"));
        assert!(report.contains("2. Nice work"));
        assert!(report.contains("## Post Analysis"));
        assert!(report.contains("positive, product launch"));
        assert!(report.contains("- screenshot of a dashboard"));
    }

    #[test]
    fn test_report_without_media_omits_section() {
        let post = sample_post();
        let report = render_report(&post, "ctx", "analysis", &["r".to_string()], &[]);
        assert!(!report.contains("## Media Descriptions"));
    }
}
