//! Pre-flight checks before expensive operations.
//!
//! Validates that required API keys and tools are available before starting
//! operations that would otherwise fail midway.

use crate::error::{Result, SvarError};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// The full pipeline needs the completion API key; media tools are
    /// checked lazily when a video actually shows up.
    Reply,
    /// Analysis and image/webpage commands need the completion API key.
    Completion,
    /// Search goes to its own endpoint with its own key.
    Search,
    /// Video analysis needs the completion API key plus ffmpeg/ffprobe.
    Video,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, search_key_env: &str) -> Result<()> {
    match operation {
        Operation::Reply | Operation::Completion => {
            check_env_key("OPENAI_API_KEY")?;
        }
        Operation::Search => {
            check_env_key(search_key_env)?;
        }
        Operation::Video => {
            check_env_key("OPENAI_API_KEY")?;
            check_tool("ffmpeg")?;
            check_tool("ffprobe")?;
        }
    }
    Ok(())
}

/// Check that an API key environment variable is set and non-empty.
fn check_env_key(name: &str) -> Result<()> {
    match std::env::var(name) {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(SvarError::Config(format!(
            "{name} is empty. Set it with: export {name}='...'"
        ))),
        Err(_) => Err(SvarError::Config(format!(
            "{name} not set. Set it with: export {name}='...'"
        ))),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(SvarError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SvarError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(SvarError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_a_config_error() {
        let err = check_env_key("SVAR_TEST_KEY_THAT_DOES_NOT_EXIST").unwrap_err();
        assert!(matches!(err, SvarError::Config(_)));
    }
}
