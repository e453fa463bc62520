//! Completion client for the LLM provider.
//!
//! [`Completer`] is the seam the review engine depends on, so tests can
//! substitute an in-process implementation. [`LlmClient`] is the real one:
//! one POST to the Messages API per call, fixed model and sampling
//! parameters, a bounded timeout and no retry.

use std::future::Future;
use std::pin::Pin;

use critic_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LlmSettings;

const SERVICE: &str = "anthropic";
const API_VERSION: &str = "2023-06-01";

/// Boxed future returned by [`Completer::complete`].
pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// Anything that turns a prompt into generated text.
pub trait Completer: Send + Sync {
    /// Send one prompt and return the first generated text segment.
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a>;
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

/// Pull the first text segment out of a Messages API response body.
fn extract_text(body: &str) -> Result<String> {
    let envelope: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| Error::MalformedCompletion(format!("unexpected envelope: {}", e)))?;

    envelope
        .content
        .into_iter()
        .find_map(|block| block.text)
        .ok_or_else(|| Error::MalformedCompletion("response contained no text".to_string()))
}

/// HTTP client for the Anthropic Messages API.
pub struct LlmClient {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { http, settings })
    }

    async fn send(&self, prompt: &str) -> Result<String> {
        let request = MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };
        debug!(model = %self.settings.model, prompt_len = prompt.len(), "Sending completion request");

        let resp = self
            .http
            .post(&self.settings.endpoint)
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Completion request failed");
                Error::Upstream {
                    service: SERVICE,
                    status: e.status().map(|s| s.as_u16()),
                    message: e.to_string(),
                }
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Upstream {
            service: SERVICE,
            status: None,
            message: format!("Unreadable response: {}", e),
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Completion endpoint returned an error");
            return Err(Error::upstream(
                SERVICE,
                status.as_u16(),
                format!("HTTP {}: {}", status, body.trim()),
            ));
        }

        let text = extract_text(&body)?;
        debug!(response_len = text.len(), "Completion received");
        Ok(text)
    }
}

impl Completer for LlmClient {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
        Box::pin(self.send(prompt))
    }
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_first_text_segment() {
        let body = r#"{
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "first"},
                {"type": "text", "text": "second"}
            ],
            "stop_reason": "end_turn"
        }"#;
        assert_eq!(extract_text(body).unwrap(), "first");
    }

    #[test]
    fn test_skips_blocks_without_text() {
        let body = r#"{"content": [{"type": "tool_use", "id": "t"}, {"type": "text", "text": "ok"}]}"#;
        assert_eq!(extract_text(body).unwrap(), "ok");
    }

    #[test]
    fn test_malformed_envelopes() {
        for body in [
            "not json",
            "{}",
            r#"{"content": []}"#,
            r#"{"content": "text"}"#,
            r#"{"content": [{"type": "text"}]}"#,
        ] {
            let err = extract_text(body).unwrap_err();
            assert!(matches!(err, Error::MalformedCompletion(_)), "{body}");
            assert_eq!(err.status_code(), 500);
        }
    }

    #[test]
    fn test_request_shape() {
        let request = MessagesRequest {
            model: "claude-3-haiku-20240307",
            max_tokens: 800,
            temperature: 0.2,
            messages: [Message {
                role: "user",
                content: "hello",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "claude-3-haiku-20240307");
        assert_eq!(json["max_tokens"], 800);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }
}
