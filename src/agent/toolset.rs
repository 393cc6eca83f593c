//! Built-in tools wired over the context capabilities.

use super::registry::{Tool, ToolRegistry};
use crate::error::{Result, SvarError};
use crate::media::{ImageAnalyzer, VideoAnalyzer};
use crate::search::SearchClient;
use crate::web::WebSummarizer;
use serde_json::json;
use std::sync::Arc;

/// Build the standard registry: search, image, webpage and video tools.
pub fn builtin_registry(
    search: Arc<SearchClient>,
    images: Arc<ImageAnalyzer>,
    web: Arc<WebSummarizer>,
    videos: Arc<VideoAnalyzer>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(Tool::new(
        "search_internet",
        "Search the internet for information",
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        }),
        Arc::new(move |args| {
            let search = search.clone();
            Box::pin(async move {
                let query = required_str(&args, "query")?;
                search.search(&query).await
            })
        }),
    ));

    registry.register(Tool::new(
        "analyze_image",
        "Analyze an image from a given URL",
        json!({
            "type": "object",
            "properties": {
                "image_url": {
                    "type": "string",
                    "description": "URL of the image to analyze"
                }
            },
            "required": ["image_url"]
        }),
        Arc::new(move |args| {
            let images = images.clone();
            Box::pin(async move {
                let url = required_str(&args, "image_url")?;
                images.describe(&url).await
            })
        }),
    ));

    registry.register(Tool::new(
        "summarize_webpage",
        "Generate a summary of a webpage's content",
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "URL of the webpage to summarize"
                }
            },
            "required": ["url"]
        }),
        Arc::new(move |args| {
            let web = web.clone();
            Box::pin(async move {
                let url = required_str(&args, "url")?;
                let summary = web.summarize_url(&url).await?;
                Ok(format!("URL content summary: {}", summary))
            })
        }),
    ));

    registry.register(Tool::new(
        "analyze_video",
        "Analyze a video by extracting and analyzing key frames",
        json!({
            "type": "object",
            "properties": {
                "video_url": {
                    "type": "string",
                    "description": "URL or path to the video file to analyze"
                }
            },
            "required": ["video_url"]
        }),
        Arc::new(move |args| {
            let videos = videos.clone();
            Box::pin(async move {
                let url = required_str(&args, "video_url")?;
                videos.describe(&url).await
            })
        }),
    ));

    registry
}

fn required_str(args: &serde_json::Value, key: &str) -> Result<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| SvarError::InvalidInput(format!("Missing required argument '{}'", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Prompts, VisionSettings, WebSettings};
    use crate::llm::{ChatCompletion, ChatMessage, ChatOptions, ChatTurn, ToolDefinition};
    use async_trait::async_trait;

    struct EchoChat;

    #[async_trait]
    impl ChatCompletion for EchoChat {
        async fn complete(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _tools: &[ToolDefinition],
            _options: &ChatOptions,
        ) -> Result<ChatTurn> {
            Ok(ChatTurn {
                content: Some("stubbed answer".to_string()),
                tool_calls: Vec::new(),
            })
        }
    }

    fn test_registry() -> ToolRegistry {
        let chat: Arc<dyn ChatCompletion> = Arc::new(EchoChat);
        builtin_registry(
            Arc::new(SearchClient::with_backend(
                chat.clone(),
                "online-model",
                Prompts::default(),
            )),
            Arc::new(ImageAnalyzer::new(
                chat.clone(),
                VisionSettings::default(),
                Prompts::default(),
            )),
            Arc::new(WebSummarizer::new(
                chat.clone(),
                WebSettings::default(),
                Prompts::default(),
            )),
            Arc::new(VideoAnalyzer::new(
                chat,
                VisionSettings::default(),
                std::env::temp_dir().join("svar-test"),
                Prompts::default(),
            )),
        )
    }

    #[test]
    fn test_all_builtin_tools_registered_in_order() {
        let registry = test_registry();
        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "search_internet",
                "analyze_image",
                "summarize_webpage",
                "analyze_video"
            ]
        );
    }

    #[test]
    fn test_schemas_declare_required_arguments() {
        let registry = test_registry();
        for def in registry.definitions() {
            let required = def.parameters["required"].as_array().unwrap();
            assert_eq!(required.len(), 1, "tool {} should require one arg", def.name);
        }
    }

    #[tokio::test]
    async fn test_search_tool_resolves_through_backend() {
        let registry = test_registry();
        let result = registry
            .execute("search_internet", r#"{"query": "rust"}"#)
            .await
            .unwrap();
        assert_eq!(result, "stubbed answer");
    }

    #[tokio::test]
    async fn test_missing_argument_is_an_execution_error() {
        let registry = test_registry();
        let err = registry
            .execute("search_internet", r#"{"q": "typo"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, SvarError::ToolExecution { .. }));
    }
}
