//! OpenAI-backed completion service.

use super::{ChatCompletion, ChatMessage, ChatOptions, ChatRole, ChatTurn, ToolCallRequest, ToolDefinition};
use crate::error::{Result, SvarError};
use crate::openai::{create_client, create_client_for};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall,
    FunctionObject, ImageUrlArgs,
};
use async_trait::async_trait;
use tracing::debug;

/// Chat completion backend over the OpenAI API (or any compatible endpoint).
pub struct OpenAiChat {
    client: async_openai::Client<OpenAIConfig>,
}

impl OpenAiChat {
    /// Backend for the default OpenAI endpoint (`OPENAI_API_KEY`).
    pub fn new() -> Self {
        Self {
            client: create_client(),
        }
    }

    /// Backend for an OpenAI-compatible endpoint with its own key env var.
    pub fn for_endpoint(api_base: &str, api_key_env: &str) -> Self {
        Self {
            client: create_client_for(api_base, api_key_env),
        }
    }
}

impl Default for OpenAiChat {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatCompletion for OpenAiChat {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        options: &ChatOptions,
    ) -> Result<ChatTurn> {
        let request_messages = convert_messages(messages)?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(model).messages(request_messages);
        if !tools.is_empty() {
            builder.tools(convert_tools(tools));
        }
        if let Some(temperature) = options.temperature {
            builder.temperature(temperature);
        }
        if let Some(max_tokens) = options.max_tokens {
            builder.max_tokens(max_tokens);
        }

        let request = builder
            .build()
            .map_err(|e| SvarError::Completion(e.to_string()))?;

        debug!("Sending completion request for model {}", model);

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SvarError::Completion(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SvarError::Completion("No choices in response".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCallRequest {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        Ok(ChatTurn {
            content: choice.message.content,
            tool_calls,
        })
    }

    async fn complete_n(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &ChatOptions,
        n: u8,
    ) -> Result<Vec<String>> {
        let request_messages = convert_messages(messages)?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(model).messages(request_messages).n(n);
        if let Some(temperature) = options.temperature {
            builder.temperature(temperature);
        }
        if let Some(max_tokens) = options.max_tokens {
            builder.max_tokens(max_tokens);
        }

        let request = builder
            .build()
            .map_err(|e| SvarError::Completion(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SvarError::Completion(e.to_string()))?;

        Ok(response
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .collect())
    }
}

/// Map conversation messages to the OpenAI request representation.
fn convert_messages(messages: &[ChatMessage]) -> Result<Vec<ChatCompletionRequestMessage>> {
    messages.iter().map(convert_message).collect()
}

fn convert_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let converted = match message.role {
        ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| SvarError::Completion(e.to_string()))?
            .into(),

        ChatRole::User => {
            let content = if message.images.is_empty() {
                ChatCompletionRequestUserMessageContent::Text(message.content.clone())
            } else {
                ChatCompletionRequestUserMessageContent::Array(user_content_parts(message)?)
            };
            ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()
                .map_err(|e| SvarError::Completion(e.to_string()))?
                .into()
        }

        ChatRole::Assistant => {
            let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
            if !message.content.is_empty() {
                builder.content(message.content.clone());
            }
            if !message.tool_calls.is_empty() {
                let calls: Vec<ChatCompletionMessageToolCall> = message
                    .tool_calls
                    .iter()
                    .map(|tc| ChatCompletionMessageToolCall {
                        id: tc.id.clone(),
                        r#type: ChatCompletionToolType::Function,
                        function: FunctionCall {
                            name: tc.name.clone(),
                            arguments: tc.arguments.clone(),
                        },
                    })
                    .collect();
                builder.tool_calls(calls);
            }
            builder
                .build()
                .map_err(|e| SvarError::Completion(e.to_string()))?
                .into()
        }

        ChatRole::Tool => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(message.tool_call_id.clone().unwrap_or_default())
            .content(message.content.clone())
            .build()
            .map_err(|e| SvarError::Completion(e.to_string()))?
            .into(),
    };

    Ok(converted)
}

/// Build a mixed text+image content array for a vision request.
fn user_content_parts(
    message: &ChatMessage,
) -> Result<Vec<ChatCompletionRequestUserMessageContentPart>> {
    let mut parts: Vec<ChatCompletionRequestUserMessageContentPart> = Vec::new();

    parts.push(
        ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(message.content.clone())
            .build()
            .map_err(|e| SvarError::Completion(e.to_string()))?
            .into(),
    );

    for image in &message.images {
        let image_url = ImageUrlArgs::default()
            .url(image.clone())
            .build()
            .map_err(|e| SvarError::Completion(e.to_string()))?;
        parts.push(
            ChatCompletionRequestMessageContentPartImageArgs::default()
                .image_url(image_url)
                .build()
                .map_err(|e| SvarError::Completion(e.to_string()))?
                .into(),
        );
    }

    Ok(parts)
}

/// Map tool definitions to the OpenAI function-calling shape.
fn convert_tools(tools: &[ToolDefinition]) -> Vec<ChatCompletionTool> {
    tools
        .iter()
        .map(|tool| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: tool.name.clone(),
                description: Some(tool.description.clone()),
                parameters: Some(tool.parameters.clone()),
                strict: None,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_tool_definitions() {
        let tools = vec![ToolDefinition {
            name: "search_internet".into(),
            description: "Search the internet for information".into(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
        }];

        let converted = convert_tools(&tools);
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].function.name, "search_internet");
        assert!(converted[0].function.parameters.is_some());
    }

    #[test]
    fn test_convert_tool_message_keeps_call_id() {
        let message = ChatMessage::tool_result("call_9", "analyze_image", "a cat");
        let converted = convert_message(&message).unwrap();
        match converted {
            ChatCompletionRequestMessage::Tool(tool) => {
                assert_eq!(tool.tool_call_id, "call_9");
            }
            other => panic!("Expected tool message, got {:?}", other),
        }
    }
}
