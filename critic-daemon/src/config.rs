//! Process configuration.
//!
//! Every setting can be given as a flag or through the environment. The
//! parsed [`Config`] is split into per-client settings once at startup and
//! never changes afterwards.

use std::fmt;
use std::time::Duration;

use axum::http::HeaderValue;
use clap::Parser;

/// Default port for the HTTP API.
pub const DEFAULT_PORT: u16 = 8000;

/// Multi-persona code review service
#[derive(Parser, Clone)]
#[command(name = "critic-daemon")]
#[command(about = "Multi-persona LLM code review service for GitHub-hosted Python files")]
#[command(version)]
pub struct Config {
    /// API key for the LLM provider
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true, value_parser = non_empty)]
    pub anthropic_api_key: String,

    /// GitHub access token (raises the anonymous rate limit)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Address to bind
    #[arg(long, env = "CRITIC_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// HTTP port to listen on
    #[arg(short, long, env = "CRITIC_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The single origin allowed to make cross-origin requests
    #[arg(long, env = "CRITIC_ALLOWED_ORIGIN", default_value = "http://localhost:3000")]
    pub allowed_origin: HeaderValue,

    /// Completion model
    #[arg(long, env = "CRITIC_MODEL", default_value = "claude-3-haiku-20240307")]
    pub model: String,

    /// Output token budget per completion
    #[arg(long, env = "CRITIC_MAX_TOKENS", default_value_t = 800)]
    pub max_tokens: u32,

    /// Sampling temperature
    #[arg(long, env = "CRITIC_TEMPERATURE", default_value_t = 0.2)]
    pub temperature: f32,

    /// Timeout for a single completion request, in seconds
    #[arg(long, env = "CRITIC_LLM_TIMEOUT_SECS", default_value_t = 30)]
    pub llm_timeout_secs: u64,

    /// Files at or above this size are left out of listings, in KiB
    #[arg(long, env = "CRITIC_MAX_FILE_SIZE_KB", default_value_t = 100)]
    pub max_file_size_kb: u64,

    /// Completion endpoint
    #[arg(long, env = "ANTHROPIC_API_URL", default_value = "https://api.anthropic.com/v1/messages")]
    pub anthropic_api_url: String,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub github_api_url: String,

    /// Base URL for raw file downloads
    #[arg(long, env = "GITHUB_RAW_URL", default_value = "https://raw.githubusercontent.com")]
    pub github_raw_url: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn non_empty(value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("must not be empty".to_string());
    }
    Ok(value.to_string())
}

impl Config {
    /// Socket address string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn github_settings(&self) -> GithubSettings {
        GithubSettings {
            api_url: self.github_api_url.trim_end_matches('/').to_string(),
            raw_url: self.github_raw_url.trim_end_matches('/').to_string(),
            token: self.github_token.clone().filter(|t| !t.trim().is_empty()),
            max_file_size_bytes: self.max_file_size_kb.saturating_mul(1024),
        }
    }

    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            endpoint: self.anthropic_api_url.clone(),
            api_key: self.anthropic_api_key.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: Duration::from_secs(self.llm_timeout_secs),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("allowed_origin", &self.allowed_origin)
            .field("model", &self.model)
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("github_api_url", &self.github_api_url)
            .field("anthropic_api_url", &self.anthropic_api_url)
            .finish_non_exhaustive()
    }
}

/// Settings for the GitHub repository client.
#[derive(Clone)]
pub struct GithubSettings {
    /// REST base, without trailing slash.
    pub api_url: String,
    /// Raw content base, without trailing slash.
    pub raw_url: String,
    pub token: Option<String>,
    /// Listing ceiling; files of this size or larger are skipped.
    pub max_file_size_bytes: u64,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            raw_url: "https://raw.githubusercontent.com".to_string(),
            token: None,
            max_file_size_bytes: 100 * 1024,
        }
    }
}

impl fmt::Debug for GithubSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubSettings")
            .field("api_url", &self.api_url)
            .field("raw_url", &self.raw_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("max_file_size_bytes", &self.max_file_size_bytes)
            .finish()
    }
}

/// Settings for the completion client.
#[derive(Clone)]
pub struct LlmSettings {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl LlmSettings {
    /// Default model and sampling parameters for the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            api_key: api_key.into(),
            model: "claude-3-haiku-20240307".to_string(),
            max_tokens: 800,
            temperature: 0.2,
            timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
