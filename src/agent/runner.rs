//! Tool-calling conversation loop.
//!
//! Drives a bounded multi-turn exchange with a completion backend: the model
//! may request tool invocations, the loop resolves them through the registry
//! and feeds the results back, until the model returns a plain answer.

use super::registry::ToolRegistry;
use crate::error::{Result, SvarError};
use crate::llm::{ChatCompletion, ChatMessage, ChatOptions, ToolCallRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default bound on loop iterations (completion calls).
const DEFAULT_MAX_ITERATIONS: usize = 8;

/// What the loop tells the model when a tool call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolFailurePolicy {
    /// Append an error-carrying tool result so the model can adapt.
    #[default]
    Report,
    /// Log the failure and continue without a tool result for that call.
    Silent,
}

impl std::str::FromStr for ToolFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "report" => Ok(ToolFailurePolicy::Report),
            "silent" => Ok(ToolFailurePolicy::Silent),
            _ => Err(format!("Unknown tool failure policy: {}", s)),
        }
    }
}

impl std::fmt::Display for ToolFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolFailurePolicy::Report => write!(f, "report"),
            ToolFailurePolicy::Silent => write!(f, "silent"),
        }
    }
}

/// Agent that resolves model tool calls through a registry.
pub struct Agent {
    client: Arc<dyn ChatCompletion>,
    model: String,
    registry: ToolRegistry,
    system_prompt: String,
    max_iterations: usize,
    failure_policy: ToolFailurePolicy,
    options: ChatOptions,
}

impl Agent {
    /// Create an agent over a populated registry.
    ///
    /// Registration must be finished before the first run; the registry is
    /// only read from here on.
    pub fn new(client: Arc<dyn ChatCompletion>, registry: ToolRegistry, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            registry,
            system_prompt: "You are a helpful assistant.".to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            failure_policy: ToolFailurePolicy::default(),
            options: ChatOptions::default(),
        }
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    /// Set the maximum number of completion calls per run.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Set how failed tool calls are reported to the model.
    pub fn with_failure_policy(mut self, policy: ToolFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set completion options (temperature, max tokens).
    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the conversation until the model returns a plain answer.
    ///
    /// The conversation is seeded with the system prompt and `user_message`,
    /// grows append-only, and is discarded when the run ends. Tool-level
    /// failures never abort the run; a completion-service failure does, with
    /// no internal retry.
    pub async fn run(&self, user_message: &str) -> Result<AgentResponse> {
        self.run_message(ChatMessage::user(user_message)).await
    }

    /// Run the conversation starting from a prepared user message.
    ///
    /// Lets callers attach images to the opening turn.
    pub async fn run_message(&self, user_message: ChatMessage) -> Result<AgentResponse> {
        let mut messages = vec![ChatMessage::system(&self.system_prompt), user_message];
        let tools = self.registry.definitions();

        let mut tool_calls_made = Vec::new();
        let mut iterations = 0;

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(SvarError::Agent(format!(
                    "Exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Loop iteration {}", iterations);

            let turn = self
                .client
                .complete(&self.model, &messages, &tools, &self.options)
                .await?;

            if turn.is_final() {
                info!("Final answer after {} iteration(s)", iterations);
                return Ok(AgentResponse {
                    content: turn.content.unwrap_or_default(),
                    tool_calls: tool_calls_made,
                    iterations,
                });
            }

            // Keep the raw requests in history so results can be correlated
            messages.push(ChatMessage::assistant_tool_calls(
                turn.content.clone(),
                turn.tool_calls.clone(),
            ));

            for call in &turn.tool_calls {
                let record = self.dispatch(call).await;

                if record.success {
                    messages.push(ChatMessage::tool_result(
                        &call.id,
                        &call.name,
                        record.output.clone(),
                    ));
                } else {
                    match self.failure_policy {
                        ToolFailurePolicy::Report => {
                            messages.push(ChatMessage::tool_result(
                                &call.id,
                                &call.name,
                                format!("Error: {}", record.output),
                            ));
                        }
                        ToolFailurePolicy::Silent => {
                            warn!(
                                "Dropping failed tool call '{}': {}",
                                call.name, record.output
                            );
                        }
                    }
                }

                tool_calls_made.push(record);
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    async fn dispatch(&self, call: &ToolCallRequest) -> ToolCallRecord {
        info!("Tool call: {}({})", call.name, call.arguments);

        match self.registry.execute(&call.name, &call.arguments).await {
            Ok(output) => {
                debug!("Tool '{}' returned {} chars", call.name, output.len());
                ToolCallRecord {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                    output,
                    success: true,
                }
            }
            Err(e) => {
                warn!("Tool call '{}' failed: {}", call.name, e);
                ToolCallRecord {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                    output: e.to_string(),
                    success: false,
                }
            }
        }
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final answer from the model.
    pub content: String,
    /// Record of every tool call made during the run.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of completion calls used.
    pub iterations: usize,
}

/// Record of one tool call made during a run.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Call identifier assigned by the model.
    pub id: String,
    /// Name of the requested tool.
    pub name: String,
    /// Raw JSON arguments from the request.
    pub arguments: String,
    /// Tool output on success, error description on failure.
    pub output: String,
    /// Whether the call resolved successfully.
    pub success: bool,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
