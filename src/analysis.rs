//! Post analysis with optional tool support.

use crate::agent::{Agent, AgentResponse, ToolRegistry};
use crate::config::{AnalysisSettings, Prompts};
use crate::error::Result;
use crate::llm::{single_turn, ChatCompletion, ChatMessage, ChatOptions};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Analyzes a post's sentiment, topics, entities, context and tone.
pub struct PostAnalyzer {
    chat: Arc<dyn ChatCompletion>,
    registry: ToolRegistry,
    settings: AnalysisSettings,
    prompts: Prompts,
}

impl PostAnalyzer {
    pub fn new(
        chat: Arc<dyn ChatCompletion>,
        registry: ToolRegistry,
        settings: AnalysisSettings,
        prompts: Prompts,
    ) -> Self {
        Self {
            chat,
            registry,
            settings,
            prompts,
        }
    }

    /// Analyze a post context with the registered tools available.
    #[instrument(skip_all)]
    pub async fn analyze(&self, post_context: &str) -> Result<AgentResponse> {
        info!("Analyzing post with {} tools", self.registry.len());

        let agent = Agent::new(self.chat.clone(), self.registry.clone(), &self.settings.model)
            .with_system_prompt(&self.system_prompt())
            .with_max_iterations(self.settings.max_iterations)
            .with_failure_policy(self.settings.tool_failure_policy);

        agent.run(&self.user_prompt(post_context)).await
    }

    /// Analyze a post context without tools, in a single exchange.
    #[instrument(skip_all)]
    pub async fn analyze_plain(&self, post_context: &str) -> Result<String> {
        info!("Analyzing post without tools");

        single_turn(
            self.chat.as_ref(),
            &self.settings.model,
            &self.system_prompt(),
            ChatMessage::user(self.user_prompt(post_context)),
            &ChatOptions::default(),
        )
        .await
    }

    fn system_prompt(&self) -> String {
        let descriptions = tool_descriptions(&self.registry);
        let mut vars = HashMap::new();
        vars.insert("tool_descriptions".to_string(), descriptions);
        self.prompts
            .render_with_custom(&self.prompts.analysis.system, &vars)
    }

    fn user_prompt(&self, post_context: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), post_context.to_string());
        self.prompts
            .render_with_custom(&self.prompts.analysis.user, &vars)
    }
}

/// Bulleted name/description lines for the system prompt.
fn tool_descriptions(registry: &ToolRegistry) -> String {
    if registry.is_empty() {
        return "   (none)".to_string();
    }
    registry
        .iter()
        .map(|tool| format!("   - `{}`: {}", tool.name(), tool.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Tool;
    use crate::error::SvarError;
    use crate::llm::{ChatRole, ChatTurn, ToolDefinition};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedChat {
        script: Mutex<VecDeque<ChatTurn>>,
        seen_systems: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatCompletion for ScriptedChat {
        async fn complete(
            &self,
            _model: &str,
            messages: &[ChatMessage],
            _tools: &[ToolDefinition],
            _options: &ChatOptions,
        ) -> Result<ChatTurn> {
            if let Some(system) = messages.iter().find(|m| m.role == ChatRole::System) {
                self.seen_systems.lock().unwrap().push(system.content.clone());
            }
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| SvarError::Completion("script exhausted".to_string()))
        }
    }

    fn echo_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Tool::new(
            "search_internet",
            "Search the internet for information",
            json!({"type": "object", "properties": {}}),
            Arc::new(|_args| Box::pin(async { Ok("context found".to_string()) })),
        ));
        registry
    }

    #[test]
    fn test_tool_descriptions_listing() {
        let listing = tool_descriptions(&echo_registry());
        assert!(listing.contains("`search_internet`"));
        assert!(listing.contains("Search the internet"));

        assert_eq!(tool_descriptions(&ToolRegistry::new()), "   (none)");
    }

    #[tokio::test]
    async fn test_analyze_interpolates_tools_into_system_prompt() {
        let chat = Arc::new(ScriptedChat {
            script: Mutex::new(VecDeque::from(vec![ChatTurn {
                content: Some("positive sentiment".to_string()),
                tool_calls: Vec::new(),
            }])),
            seen_systems: Mutex::new(Vec::new()),
        });

        let analyzer = PostAnalyzer::new(
            chat.clone(),
            echo_registry(),
            AnalysisSettings::default(),
            Prompts::default(),
        );

        let response = analyzer.analyze("## Post Text\n\nhello").await.unwrap();
        assert_eq!(response.content, "positive sentiment");
        assert_eq!(response.iterations, 1);

        let systems = chat.seen_systems.lock().unwrap();
        assert!(systems[0].contains("`search_internet`"));
        assert!(!systems[0].contains("{{tool_descriptions}}"));
    }

    #[tokio::test]
    async fn test_analyze_plain_skips_the_loop() {
        let chat = Arc::new(ScriptedChat {
            script: Mutex::new(VecDeque::from(vec![ChatTurn {
                content: Some("neutral".to_string()),
                tool_calls: Vec::new(),
            }])),
            seen_systems: Mutex::new(Vec::new()),
        });

        let analyzer = PostAnalyzer::new(
            chat,
            echo_registry(),
            AnalysisSettings::default(),
            Prompts::default(),
        );

        let analysis = analyzer.analyze_plain("some post").await.unwrap();
        assert_eq!(analysis, "neutral");
    }
}
