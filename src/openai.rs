//! OpenAI client configuration with sensible defaults.

use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client with configured timeout.
///
/// Uses a 5-minute timeout by default to prevent hung API calls.
pub fn create_client() -> Client<OpenAIConfig> {
    Client::with_config(OpenAIConfig::default()).with_http_client(http_client())
}

/// Create a client against an OpenAI-compatible endpoint.
///
/// `api_key_env` names the environment variable holding the key for that
/// endpoint (e.g. `PERPLEXITY_API_KEY`).
pub fn create_client_for(api_base: &str, api_key_env: &str) -> Client<OpenAIConfig> {
    let api_key = std::env::var(api_key_env).unwrap_or_default();
    let config = OpenAIConfig::new()
        .with_api_base(api_base)
        .with_api_key(api_key);
    Client::with_config(config).with_http_client(http_client())
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
}
