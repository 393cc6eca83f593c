//! Image loading and description through a vision model.

use super::is_remote;
use crate::config::{Prompts, VisionSettings};
use crate::error::{Result, SvarError};
use crate::llm::{single_turn, ChatCompletion, ChatMessage, ChatOptions};
use base64::Engine;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Describes images with a vision-capable model.
pub struct ImageAnalyzer {
    chat: Arc<dyn ChatCompletion>,
    http: reqwest::Client,
    settings: VisionSettings,
    prompts: Prompts,
}

impl ImageAnalyzer {
    pub fn new(chat: Arc<dyn ChatCompletion>, settings: VisionSettings, prompts: Prompts) -> Self {
        Self {
            chat,
            http: reqwest::Client::new(),
            settings,
            prompts,
        }
    }

    /// Describe the image at a URL or local path.
    #[instrument(skip(self))]
    pub async fn describe(&self, source: &str) -> Result<String> {
        info!("Analyzing image: {}", source);

        let bytes = self.load(source).await?;
        let data_url = to_data_url(&bytes, mime_for(source));

        let description = single_turn(
            self.chat.as_ref(),
            &self.settings.model,
            &self.prompts.vision.image_system,
            ChatMessage::user_with_images(self.prompts.vision.image_user.clone(), vec![data_url]),
            &ChatOptions {
                temperature: None,
                max_tokens: Some(self.settings.max_tokens),
            },
        )
        .await?;

        debug!("Image description: {} chars", description.len());
        Ok(description)
    }

    async fn load(&self, source: &str) -> Result<Vec<u8>> {
        if is_remote(source) {
            let response = self.http.get(source).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(SvarError::Media(format!(
                    "Downloading image {} returned status {}",
                    source, status
                )));
            }
            Ok(response.bytes().await?.to_vec())
        } else {
            let path = Path::new(source);
            if !path.exists() {
                return Err(SvarError::Media(format!("Image file not found: {}", source)));
            }
            Ok(tokio::fs::read(path).await?)
        }
    }
}

/// Encode raw image bytes as a base64 data URL.
pub fn to_data_url(bytes: &[u8], mime: &str) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn mime_for(source: &str) -> &'static str {
    let lowered = source.to_lowercase();
    let path = lowered.split(['?', '#']).next().unwrap_or(&lowered);
    if path.ends_with(".png") {
        "image/png"
    } else if path.ends_with(".gif") {
        "image/gif"
    } else if path.ends_with(".webp") {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatRole, ChatTurn, ToolDefinition};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CapturingChat {
        seen: Mutex<Vec<ChatMessage>>,
    }

    #[async_trait]
    impl ChatCompletion for CapturingChat {
        async fn complete(
            &self,
            _model: &str,
            messages: &[ChatMessage],
            _tools: &[ToolDefinition],
            _options: &ChatOptions,
        ) -> Result<ChatTurn> {
            self.seen.lock().unwrap().extend_from_slice(messages);
            Ok(ChatTurn {
                content: Some("a red square".to_string()),
                tool_calls: Vec::new(),
            })
        }
    }

    #[test]
    fn test_data_url_encoding() {
        let url = to_data_url(&[0xFF, 0xD8, 0xFF], "image/jpeg");
        assert_eq!(url, "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn test_mime_from_source() {
        assert_eq!(mime_for("https://example.com/a.PNG"), "image/png");
        assert_eq!(mime_for("pic.webp?x=1"), "image/webp");
        assert_eq!(mime_for("photo.jpg"), "image/jpeg");
        assert_eq!(mime_for("no-extension"), "image/jpeg");
    }

    #[tokio::test]
    async fn test_describe_local_file_attaches_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let chat = Arc::new(CapturingChat {
            seen: Mutex::new(Vec::new()),
        });
        let analyzer = ImageAnalyzer::new(
            chat.clone(),
            VisionSettings::default(),
            Prompts::default(),
        );

        let description = analyzer.describe(path.to_str().unwrap()).await.unwrap();
        assert_eq!(description, "a red square");

        let seen = chat.seen.lock().unwrap();
        let user = seen.iter().find(|m| m.role == ChatRole::User).unwrap();
        assert_eq!(user.images.len(), 1);
        assert!(user.images[0].starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_describe_missing_file_errors() {
        let analyzer = ImageAnalyzer::new(
            Arc::new(CapturingChat {
                seen: Mutex::new(Vec::new()),
            }),
            VisionSettings::default(),
            Prompts::default(),
        );

        let err = analyzer.describe("/nonexistent/img.jpg").await.unwrap_err();
        assert!(matches!(err, SvarError::Media(_)));
    }
}
