//! Configuration module for Svar.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{
    AnalysisPrompts, Prompts, ReplyPrompts, SearchPrompts, VisionPrompts, WebPrompts,
};
pub use settings::{
    AnalysisSettings, GeneralSettings, PostSettings, PromptSettings, ReplySettings,
    SearchSettings, Settings, VisionSettings, WebSettings,
};
