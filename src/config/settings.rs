//! Configuration settings for Svar.

use crate::agent::ToolFailurePolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub post: PostSettings,
    pub analysis: AnalysisSettings,
    pub search: SearchSettings,
    pub vision: VisionSettings,
    pub web: WebSettings,
    pub reply: ReplySettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory where generated reply reports are written.
    pub output_dir: String,
    /// Directory for temporary files (downloaded media, extracted frames).
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            output_dir: "~/.svar/replies".to_string(),
            temp_dir: "/tmp/svar".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Post fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostSettings {
    /// Base URL of the FxTwitter-compatible post API.
    pub api_base: String,
}

impl Default for PostSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.fxtwitter.com".to_string(),
        }
    }
}

/// Post analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Model used for the tool-augmented analysis loop.
    pub model: String,
    /// Maximum completion calls per analysis run.
    pub max_iterations: usize,
    /// How failed tool calls are reported back to the model.
    pub tool_failure_policy: ToolFailurePolicy,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_iterations: 8,
            tool_failure_policy: ToolFailurePolicy::Report,
        }
    }
}

/// Internet search settings (OpenAI-compatible online model endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Online model to query.
    pub model: String,
    /// Base URL of the search endpoint.
    pub api_base: String,
    /// Environment variable holding the API key for the endpoint.
    pub api_key_env: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            model: "llama-3.1-sonar-small-128k-online".to_string(),
            api_base: "https://api.perplexity.ai".to_string(),
            api_key_env: "PERPLEXITY_API_KEY".to_string(),
        }
    }
}

/// Image and video frame analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    /// Vision-capable model for image and frame description.
    pub model: String,
    /// Token cap for media descriptions.
    pub max_tokens: u32,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_tokens: 300,
        }
    }
}

/// Webpage summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSettings {
    /// Model used to summarize page text.
    pub model: String,
    /// Token cap for summaries.
    pub max_tokens: u32,
    /// Sampling temperature for summaries.
    pub temperature: f32,
    /// Character cap for the truncation fallback when summarization fails.
    pub max_content_chars: usize,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            max_content_chars: 20_000,
        }
    }
}

/// Reply generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplySettings {
    /// Model used to draft candidate replies.
    pub model: String,
    /// Number of candidate replies to generate.
    pub count: u8,
    /// Sampling temperature for reply drafts.
    pub temperature: f32,
    /// Criteria the replies must satisfy, injected into the prompt.
    pub criteria: String,
}

impl Default for ReplySettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            count: 3,
            temperature: 0.9,
            criteria: "\
- Stay under 280 characters
- Be relevant to the post and its context
- Match the tone of the conversation
- No hashtags unless the post uses them
- Sound like a person, not a brand"
                .to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SvarError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("svar")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let settings = Settings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.analysis.model, settings.analysis.model);
        assert_eq!(parsed.reply.count, settings.reply.count);
        assert_eq!(
            parsed.analysis.tool_failure_policy,
            ToolFailurePolicy::Report
        );
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [analysis]
            model = "gpt-4o-mini"
            max_iterations = 4

            [reply]
            count = 5
            "#,
        )
        .unwrap();

        assert_eq!(settings.analysis.model, "gpt-4o-mini");
        assert_eq!(settings.analysis.max_iterations, 4);
        assert_eq!(settings.reply.count, 5);
        // Untouched sections keep their defaults
        assert_eq!(settings.search.api_base, "https://api.perplexity.ai");
        assert_eq!(settings.vision.max_tokens, 300);
    }

    #[test]
    fn test_failure_policy_from_config() {
        let settings: Settings = toml::from_str(
            r#"
            [analysis]
            tool_failure_policy = "silent"
            "#,
        )
        .unwrap();
        assert_eq!(
            settings.analysis.tool_failure_policy,
            ToolFailurePolicy::Silent
        );
    }
}
