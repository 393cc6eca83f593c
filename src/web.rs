//! Webpage fetching and summarization.

use crate::config::{Prompts, WebSettings};
use crate::error::{Result, SvarError};
use crate::llm::{single_turn, ChatCompletion, ChatMessage, ChatOptions};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".bmp", ".webp"];

/// Fetches webpages and condenses them into summaries.
pub struct WebSummarizer {
    chat: Arc<dyn ChatCompletion>,
    http: reqwest::Client,
    settings: WebSettings,
    prompts: Prompts,
}

impl WebSummarizer {
    pub fn new(chat: Arc<dyn ChatCompletion>, settings: WebSettings, prompts: Prompts) -> Self {
        Self {
            chat,
            http: reqwest::Client::new(),
            settings,
            prompts,
        }
    }

    /// Fetch a page and return a summary of its content.
    ///
    /// Image URLs are rejected up front; `analyze_image` is the tool for
    /// those. If the summarization call fails, the stripped page text is
    /// returned truncated instead.
    #[instrument(skip(self))]
    pub async fn summarize_url(&self, url: &str) -> Result<String> {
        if is_image_url(url) {
            return Err(SvarError::InvalidInput(format!(
                "URL points to an image, not a webpage: {}",
                url
            )));
        }

        info!("Fetching webpage: {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SvarError::Web(format!(
                "Fetching {} returned status {}",
                url, status
            )));
        }

        let html = response.text().await?;
        let text = strip_html(&html);
        if text.trim().is_empty() {
            return Err(SvarError::Web(format!("No readable content at {}", url)));
        }

        match self.summarize_text(&text).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                warn!("Summarization failed, falling back to truncation: {}", e);
                Ok(truncate(&text, self.settings.max_content_chars))
            }
        }
    }

    /// Summarize already-extracted page text.
    pub async fn summarize_text(&self, content: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("content".to_string(), content.to_string());
        let user = self
            .prompts
            .render_with_custom(&self.prompts.web.user, &vars);

        single_turn(
            self.chat.as_ref(),
            &self.settings.model,
            &self.prompts.web.system,
            ChatMessage::user(user),
            &ChatOptions {
                temperature: Some(self.settings.temperature),
                max_tokens: Some(self.settings.max_tokens),
            },
        )
        .await
    }
}

/// Check whether a URL names a common image format.
pub fn is_image_url(url: &str) -> bool {
    let lowered = url.to_lowercase();
    let path = lowered.split(['?', '#']).next().unwrap_or(&lowered);
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Reduce an HTML document to its visible text.
///
/// Drops script and style blocks, strips tags, decodes the common entities
/// and collapses runs of whitespace.
pub fn strip_html(html: &str) -> String {
    let without_scripts = drop_element(html, "script");
    let without_styles = drop_element(&without_scripts, "style");

    let mut text = String::with_capacity(without_styles.len() / 2);
    let mut in_tag = false;
    for ch in without_styles.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                // Tag boundaries separate words in the rendered page
                text.push(' ');
            }
            c if !in_tag => text.push(c),
            _ => {}
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove every `<name ...>...</name>` block, case-insensitively.
fn drop_element(html: &str, name: &str) -> String {
    // ASCII lowering keeps byte offsets valid for slicing the original
    let lowered = html.to_ascii_lowercase();
    let open = format!("<{}", name);
    let close = format!("</{}>", name);

    let mut result = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(start) = lowered[pos..].find(&open) {
        let start = pos + start;
        result.push_str(&html[pos..start]);
        match lowered[start..].find(&close) {
            Some(end) => pos = start + end + close.len(),
            None => {
                // Unclosed block, drop the rest
                pos = html.len();
                break;
            }
        }
    }
    result.push_str(&html[pos..]);
    result
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}
