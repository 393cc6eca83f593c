//! Error types for Svar.

use thiserror::Error;

/// Library-level error type for Svar operations.
#[derive(Error, Debug)]
pub enum SvarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Post fetch failed: {0}")]
    Post(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Malformed arguments for tool '{name}': {message}")]
    MalformedArguments { name: String, message: String },

    #[error("Tool '{name}' failed: {source}")]
    ToolExecution {
        name: String,
        #[source]
        source: Box<SvarError>,
    },

    #[error("Completion service error: {0}")]
    Completion(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Media processing failed: {0}")]
    Media(String),

    #[error("Web content error: {0}")]
    Web(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Svar operations.
pub type Result<T> = std::result::Result<T, SvarError>;
