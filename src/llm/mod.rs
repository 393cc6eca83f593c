//! Completion service abstraction.
//!
//! Defines the message types exchanged with a chat completion endpoint and
//! the [`ChatCompletion`] trait implemented by concrete backends. The agent
//! loop and the single-turn helpers only depend on this boundary, which keeps
//! them testable against scripted backends.

mod openai;

pub use openai::OpenAiChat;

use crate::error::{Result, SvarError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A single message in a conversation.
///
/// Tool messages carry the id and name of the tool call they answer so the
/// model can correlate results with its own requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Image attachments (data URLs or https URLs) for vision requests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// Tool invocations requested in this assistant turn.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    /// Id of the tool call this tool message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Name of the tool that produced this tool message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl ChatMessage {
    fn bare(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            images: Vec::new(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            tool_name: None,
        }
    }

    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::bare(ChatRole::System, content)
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::bare(ChatRole::User, content)
    }

    /// A user message with image attachments.
    pub fn user_with_images(content: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            images,
            ..Self::bare(ChatRole::User, content)
        }
    }

    /// A plain assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::bare(ChatRole::Assistant, content)
    }

    /// An assistant turn that requested tool invocations.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls,
            ..Self::bare(ChatRole::Assistant, content.unwrap_or_default())
        }
    }

    /// A tool result answering the call with the given id.
    pub fn tool_result(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            tool_name: Some(tool_name.into()),
            ..Self::bare(ChatRole::Tool, content)
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Opaque call identifier assigned by the completion service.
    pub id: String,
    /// Name of the requested tool.
    pub name: String,
    /// Serialized JSON arguments, exactly as emitted by the model.
    pub arguments: String,
}

/// Declarative description of a tool offered to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema for the tool's arguments.
    pub parameters: serde_json::Value,
}

/// One assistant turn from the completion service.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// Assistant text, if any.
    pub content: Option<String>,
    /// Tool invocations requested in this turn.
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ChatTurn {
    /// True when the turn is a plain answer with no tool calls.
    pub fn is_final(&self) -> bool {
        self.tool_calls.is_empty()
    }
}

/// Options for a completion request.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Trait for chat completion backends.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Request one assistant turn for the given history.
    ///
    /// When `tools` is non-empty the backend advertises them with tool
    /// choice left to the model.
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        options: &ChatOptions,
    ) -> Result<ChatTurn>;

    /// Request `n` independent assistant turns for the same history.
    async fn complete_n(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &ChatOptions,
        n: u8,
    ) -> Result<Vec<String>> {
        let mut choices = Vec::with_capacity(n as usize);
        for _ in 0..n {
            let turn = self.complete(model, messages, &[], options).await?;
            choices.push(turn.content.unwrap_or_default());
        }
        Ok(choices)
    }
}

/// Run one system+user exchange and return the assistant text.
///
/// The user message is passed whole so callers can attach images.
pub async fn single_turn(
    client: &dyn ChatCompletion,
    model: &str,
    system_prompt: &str,
    user: ChatMessage,
    options: &ChatOptions,
) -> Result<String> {
    let messages = vec![ChatMessage::system(system_prompt), user];
    let turn = client.complete(model, &messages, &[], options).await?;
    turn.content
        .filter(|c| !c.is_empty())
        .ok_or_else(|| SvarError::Completion("Empty response from model".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_carries_correlation() {
        let msg = ChatMessage::tool_result("call_1", "search_internet", "result");
        assert_eq!(msg.role, ChatRole::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.tool_name.as_deref(), Some("search_internet"));
        assert_eq!(msg.content, "result");
    }

    #[test]
    fn test_turn_finality() {
        let final_turn = ChatTurn {
            content: Some("done".into()),
            tool_calls: Vec::new(),
        };
        assert!(final_turn.is_final());

        let tool_turn = ChatTurn {
            content: None,
            tool_calls: vec![ToolCallRequest {
                id: "c1".into(),
                name: "search_internet".into(),
                arguments: "{}".into(),
            }],
        };
        assert!(!tool_turn.is_final());
    }
}
