//! Persona review engine.
//!
//! Each selected persona becomes one independent completion request. The
//! requests run concurrently and are joined fail-fast: the first error
//! aborts the whole set and no partial [`ReviewSet`] is returned.

use std::sync::Arc;
use std::time::Instant;

use critic_core::persona::{self, Persona};
use critic_core::{Result, ReviewSet};
use futures::future::try_join_all;
use tracing::debug;

use crate::llm::Completer;

/// Build the prompt for one persona.
///
/// A non-empty summary is placed ahead of the raw code.
pub fn persona_prompt(persona: &Persona, code: &str, summary: Option<&str>) -> String {
    match summary.filter(|s| !s.trim().is_empty()) {
        Some(summary) => format!(
            "As a {}, {}. Here is a brief summary of the code:\n{}\n\nHere is the code:\n{}",
            persona.role, persona.instruction, summary, code
        ),
        None => format!("As a {}, {}:\n\n{}", persona.role, persona.instruction, code),
    }
}

/// Runs persona reviews against a [`Completer`].
#[derive(Clone)]
pub struct ReviewEngine {
    completer: Arc<dyn Completer>,
}

impl ReviewEngine {
    pub fn new(completer: Arc<dyn Completer>) -> Self {
        Self { completer }
    }

    /// Review `code` as the persona named `key`.
    pub async fn review_as(&self, key: &str, code: &str, summary: Option<&str>) -> Result<String> {
        let persona = persona::lookup(key)?;
        self.review_with(persona, code, summary).await
    }

    async fn review_with(
        &self,
        persona: &'static Persona,
        code: &str,
        summary: Option<&str>,
    ) -> Result<String> {
        let prompt = persona_prompt(persona, code, summary);
        debug!(persona = persona.key, "Requesting persona review");
        self.completer.complete(&prompt).await
    }

    /// Review `code` as every persona in `keys`, concurrently.
    ///
    /// Duplicate keys are reviewed once. Unknown keys fail before any
    /// request is sent.
    pub async fn review_all(
        &self,
        keys: &[&str],
        code: &str,
        summary: Option<&str>,
    ) -> Result<ReviewSet> {
        let mut personas = persona::select(keys)?;
        let mut seen = Vec::with_capacity(personas.len());
        personas.retain(|p| {
            let fresh = !seen.contains(&p.key);
            seen.push(p.key);
            fresh
        });

        let start = Instant::now();
        let reviews = try_join_all(personas.into_iter().map(|persona| async move {
            let text = self.review_with(persona, code, summary).await?;
            Ok::<_, critic_core::Error>((persona, text))
        }))
        .await?;

        debug!(
            reviews = reviews.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Persona reviews complete"
        );
        Ok(reviews.into_iter().collect())
    }
}
