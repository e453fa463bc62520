//! Shared application state for the server.

use std::sync::Arc;

use axum::http::HeaderValue;

use crate::config::Config;
use crate::github::RepositoryClient;
use crate::llm::{Completer, LlmClient};
use crate::review::{Aggregator, ReviewEngine};

/// Read-only dependencies handed to every request handler.
///
/// Built once at startup; nothing in here is mutated afterwards, so
/// concurrent requests share it without locking.
#[derive(Clone)]
pub struct AppState {
    /// GitHub metadata, listing and raw-content client
    pub repos: Arc<RepositoryClient>,
    /// Persona fan-out
    pub engine: ReviewEngine,
    /// Action plans and bullet digests
    pub aggregator: Aggregator,
    /// The single origin allowed by CORS
    pub allowed_origin: HeaderValue,
}

impl AppState {
    pub fn new(
        repos: RepositoryClient,
        completer: Arc<dyn Completer>,
        allowed_origin: HeaderValue,
    ) -> Self {
        Self {
            repos: Arc::new(repos),
            engine: ReviewEngine::new(completer.clone()),
            aggregator: Aggregator::new(completer),
            allowed_origin,
        }
    }

    /// Wire the real GitHub and LLM clients from process configuration.
    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        let repos = RepositoryClient::new(config.github_settings())?;
        let llm = LlmClient::new(config.llm_settings())?;
        Ok(Self::new(repos, Arc::new(llm), config.allowed_origin.clone()))
    }
}
