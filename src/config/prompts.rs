//! Prompt templates for Svar.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub analysis: AnalysisPrompts,
    pub reply: ReplyPrompts,
    pub search: SearchPrompts,
    pub vision: VisionPrompts,
    pub web: WebPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompts for the tool-augmented post analysis loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPrompts {
    pub system: String,
    pub user: String,
}

impl Default for AnalysisPrompts {
    fn default() -> Self {
        Self {
            system: r#"Role: You are an expert at analyzing social media content, especially short posts.

Instructions: Analyze the given post and provide insights on:
1. Sentiment: Determine if the overall sentiment is positive, negative, or neutral.
2. Topics: Identify the main topics or themes discussed.
3. Entities: Recognize notable entities (people, organizations, products, etc.).
4. Context: Provide relevant background information using the available tools.
5. Tone: Describe the overall tone (formal, casual, humorous, sarcastic, etc.).

Function calling: Use the supplied tools to help analyze the post.
Available tools:
{{tool_descriptions}}"#
                .to_string(),

            user: "Analyze this post:\n\n{{context}}".to_string(),
        }
    }
}

/// Prompts for reply generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyPrompts {
    pub system: String,
    pub user: String,
}

impl Default for ReplyPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an expert at generating contextually appropriate replies to social media posts.
Generate engaging and relevant responses while maintaining the specified personality
and adhering to given criteria."#
                .to_string(),

            user: r#"# Generate a reply to the following post:
"{{post}}"

# Post Analysis:
{{analysis}}

# Requirements:
{{criteria}}"#
                .to_string(),
        }
    }
}

/// Prompts for internet search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPrompts {
    pub system: String,
    pub user: String,
}

impl Default for SearchPrompts {
    fn default() -> Self {
        Self {
            system: "You are a helpful assistant that searches the internet for information."
                .to_string(),
            user: "Search the internet for: {{query}}".to_string(),
        }
    }
}

/// Prompts for image and video frame description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionPrompts {
    pub image_system: String,
    pub image_user: String,
    pub video_system: String,
    pub video_user: String,
}

impl Default for VisionPrompts {
    fn default() -> Self {
        Self {
            image_system: r#"You are an image analysis assistant. Analyze the provided image and
describe its content in detail, noting important features, objects, and any text present."#
                .to_string(),
            image_user: "Analyze the following image:".to_string(),

            video_system: r#"You are a media processing assistant. Analyze the provided video frames and
describe the content, noting any changes or progression across the frames."#
                .to_string(),
            video_user: "Analyze the following frames from a video:".to_string(),
        }
    }
}

/// Prompts for webpage summarization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebPrompts {
    pub system: String,
    pub user: String,
}

impl Default for WebPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a web content analysis assistant. Process web pages and provide
clear, concise summaries of their content while preserving key information."#
                .to_string(),
            user: "Please provide a comprehensive summary of the following web content:\n\n{{content}}"
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let analysis_path = custom_path.join("analysis.toml");
            if analysis_path.exists() {
                let content = std::fs::read_to_string(&analysis_path)?;
                prompts.analysis = toml::from_str(&content)?;
            }

            let reply_path = custom_path.join("reply.toml");
            if reply_path.exists() {
                let content = std::fs::read_to_string(&reply_path)?;
                prompts.reply = toml::from_str(&content)?;
            }

            let search_path = custom_path.join("search.toml");
            if search_path.exists() {
                let content = std::fs::read_to_string(&search_path)?;
                prompts.search = toml::from_str(&content)?;
            }

            let vision_path = custom_path.join("vision.toml");
            if vision_path.exists() {
                let content = std::fs::read_to_string(&vision_path)?;
                prompts.vision = toml::from_str(&content)?;
            }

            let web_path = custom_path.join("web.toml");
            if web_path.exists() {
                let content = std::fs::read_to_string(&web_path)?;
                prompts.web = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        // Start with custom variables, then override with provided vars
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.analysis.system.is_empty());
        assert!(!prompts.reply.user.is_empty());
        assert!(prompts.analysis.system.contains("{{tool_descriptions}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Search the internet for: {{query}}";
        let mut vars = std::collections::HashMap::new();
        vars.insert("query".to_string(), "rust 1.80 release".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Search the internet for: rust 1.80 release");
    }

    #[test]
    fn test_custom_variables_are_overridden_by_call_site() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("criteria".to_string(), "from-config".to_string());

        let mut vars = std::collections::HashMap::new();
        vars.insert("criteria".to_string(), "from-call".to_string());

        let result = prompts.render_with_custom("{{criteria}}", &vars);
        assert_eq!(result, "from-call");
    }
}
