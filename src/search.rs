//! Internet search through an OpenAI-compatible online model endpoint.

use crate::config::{Prompts, SearchSettings};
use crate::error::Result;
use crate::llm::{single_turn, ChatCompletion, ChatMessage, ChatOptions, OpenAiChat};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Client for online search models (Perplexity-style endpoints).
pub struct SearchClient {
    chat: Arc<dyn ChatCompletion>,
    model: String,
    prompts: Prompts,
}

impl SearchClient {
    /// Create a client against the configured search endpoint.
    pub fn new(settings: &SearchSettings, prompts: Prompts) -> Self {
        Self {
            chat: Arc::new(OpenAiChat::for_endpoint(
                &settings.api_base,
                &settings.api_key_env,
            )),
            model: settings.model.clone(),
            prompts,
        }
    }

    /// Create a client over an existing backend.
    pub fn with_backend(chat: Arc<dyn ChatCompletion>, model: &str, prompts: Prompts) -> Self {
        Self {
            chat,
            model: model.to_string(),
            prompts,
        }
    }

    /// Run a search query and return the model's answer.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<String> {
        info!("Searching: {}", query);

        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.to_string());
        let user = self
            .prompts
            .render_with_custom(&self.prompts.search.user, &vars);

        let result = single_turn(
            self.chat.as_ref(),
            &self.model,
            &self.prompts.search.system,
            ChatMessage::user(user),
            &ChatOptions::default(),
        )
        .await?;

        info!("Search returned {} chars", result.len());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatRole, ChatTurn, ToolDefinition};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CapturingChat {
        reply: String,
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
                content: Some(self.reply.clone()),
                tool_calls: Vec::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_search_renders_query_into_prompt() {
        let chat = Arc::new(CapturingChat {
            reply: "Rust 1.80 shipped LazyCell".to_string(),
            seen: Mutex::new(Vec::new()),
        });
        let client = SearchClient::with_backend(chat.clone(), "online-model", Prompts::default());

        let answer = client.search("rust 1.80 release").await.unwrap();
        assert_eq!(answer, "Rust 1.80 shipped LazyCell");

        let seen = chat.seen.lock().unwrap();
        let user = seen.iter().find(|m| m.role == ChatRole::User).unwrap();
        assert!(user.content.contains("rust 1.80 release"));
    }
}
