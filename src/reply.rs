//! Candidate reply generation.

use crate::config::{Prompts, ReplySettings};
use crate::error::{Result, SvarError};
use crate::llm::{ChatCompletion, ChatMessage, ChatOptions};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Drafts candidate replies to an analyzed post.
pub struct ReplyGenerator {
    chat: Arc<dyn ChatCompletion>,
    settings: ReplySettings,
    prompts: Prompts,
}

impl ReplyGenerator {
    pub fn new(chat: Arc<dyn ChatCompletion>, settings: ReplySettings, prompts: Prompts) -> Self {
        Self {
            chat,
            settings,
            prompts,
        }
    }

    /// Generate candidate replies for a post given its analysis.
    #[instrument(skip_all)]
    pub async fn generate(&self, post_text: &str, analysis: &str) -> Result<Vec<String>> {
        info!("Generating {} candidate replies", self.settings.count);

        let mut vars = HashMap::new();
        vars.insert("post".to_string(), post_text.to_string());
        vars.insert("analysis".to_string(), analysis.to_string());
        vars.insert("criteria".to_string(), self.settings.criteria.clone());

        let messages = vec![
            ChatMessage::system(&self.prompts.reply.system),
            ChatMessage::user(self.prompts.render_with_custom(&self.prompts.reply.user, &vars)),
        ];

        let options = ChatOptions {
            temperature: Some(self.settings.temperature),
            max_tokens: None,
        };

        let replies = self
            .chat
            .complete_n(&self.settings.model, &messages, &options, self.settings.count)
            .await?;

        let replies: Vec<String> = replies.into_iter().filter(|r| !r.is_empty()).collect();
        if replies.is_empty() {
            return Err(SvarError::Completion("No replies generated".to_string()));
        }

        info!("Generated {} replies", replies.len());
        Ok(replies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatRole, ChatTurn, ToolDefinition};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CountingChat {
        calls: Mutex<u32>,
        seen_users: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatCompletion for CountingChat {
        async fn complete(
            &self,
            _model: &str,
            messages: &[ChatMessage],
            _tools: &[ToolDefinition],
            _options: &ChatOptions,
        ) -> Result<ChatTurn> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if let Some(user) = messages.iter().find(|m| m.role == ChatRole::User) {
                self.seen_users.lock().unwrap().push(user.content.clone());
            }
            Ok(ChatTurn {
                content: Some(format!("reply {}", *calls)),
                tool_calls: Vec::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_generates_configured_number_of_replies() {
        let chat = Arc::new(CountingChat {
            calls: Mutex::new(0),
            seen_users: Mutex::new(Vec::new()),
        });
        let generator = ReplyGenerator::new(chat.clone(), ReplySettings::default(), Prompts::default());

        let replies = generator
            .generate("great launch!", "positive, tech topic")
            .await
            .unwrap();
        assert_eq!(replies.len(), ReplySettings::default().count as usize);
        assert_eq!(replies[0], "reply 1");

        // The prompt carries post, analysis and criteria
        let users = chat.seen_users.lock().unwrap();
        assert!(users[0].contains("great launch!"));
        assert!(users[0].contains("positive, tech topic"));
        assert!(users[0].contains("280 characters"));
    }

    struct EmptyChat;

    #[async_trait]
    impl ChatCompletion for EmptyChat {
        async fn complete(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _tools: &[ToolDefinition],
            _options: &ChatOptions,
        ) -> Result<ChatTurn> {
            Ok(ChatTurn {
                content: None,
                tool_calls: Vec::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_empty_completions_are_an_error() {
        let generator = ReplyGenerator::new(
            Arc::new(EmptyChat),
            ReplySettings::default(),
            Prompts::default(),
        );
        let err = generator.generate("post", "analysis").await.unwrap_err();
        assert!(matches!(err, SvarError::Completion(_)));
    }
}
