//! Condense persona critiques with one more completion.

use std::sync::Arc;

use critic_core::{Result, ReviewSet};
use tracing::debug;

use crate::llm::Completer;

/// Prompt asking for a prioritized plan from labelled critiques.
pub fn action_plan_prompt(reviews: &ReviewSet) -> String {
    let mut prompt = format!(
        "Here are {} expert reviews of the same code.\n\n",
        reviews.len()
    );
    for review in reviews.iter() {
        prompt.push_str(&format!(
            "-- {} Review:\n{}\n\n",
            review.persona.label, review.text
        ));
    }
    prompt.push_str(
        "Combine them into a single prioritized action plan for improving the code. \
         Merge overlapping points and put the most important changes first.",
    );
    prompt
}

/// Prompt asking for a bullet digest of unlabelled review texts.
pub fn bullet_summary_prompt<S: AsRef<str>>(texts: &[S]) -> String {
    let body = texts
        .iter()
        .map(|t| t.as_ref().trim())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Here are several code reviews of the same file:\n\n{}\n\n\
         Condense them into a short bullet-point summary of the most important \
         issues and recommended fixes.",
        body
    )
}

/// Produces action plans and bullet digests.
#[derive(Clone)]
pub struct Aggregator {
    completer: Arc<dyn Completer>,
}

impl Aggregator {
    pub fn new(completer: Arc<dyn Completer>) -> Self {
        Self { completer }
    }

    /// Synthesize an improvement plan from a review set.
    pub async fn action_plan(&self, reviews: &ReviewSet) -> Result<String> {
        let prompt = action_plan_prompt(reviews);
        debug!(reviews = reviews.len(), "Requesting action plan");
        self.completer.complete(&prompt).await
    }

    /// Condense raw review texts into bullet points.
    pub async fn bullet_summary<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<String> {
        let prompt = bullet_summary_prompt(texts);
        debug!(reviews = texts.len(), "Requesting bullet summary");
        self.completer.complete(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::CompletionFuture;
    use critic_core::persona;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        prompts: Mutex<Vec<String>>,
    }

    impl Completer for Recorder {
        fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Box::pin(async { Ok("plan".to_string()) })
        }
    }

    fn sample_reviews() -> ReviewSet {
        vec![
            (persona::lookup("security").unwrap(), "Use parameterized SQL.".to_string()),
            (persona::lookup("ux").unwrap(), "Rename `x`.".to_string()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_action_plan_prompt_labels_each_review() {
        let prompt = action_plan_prompt(&sample_reviews());
        assert!(prompt.starts_with("Here are 2 expert reviews"));

        let security = prompt.find("-- Security Review:\nUse parameterized SQL.").unwrap();
        let ux = prompt.find("-- UX Review:\nRename `x`.").unwrap();
        assert!(security < ux);
        assert!(prompt.contains("action plan"));
    }

    #[test]
    fn test_bullet_prompt_is_unlabelled() {
        let prompt = bullet_summary_prompt(&["first review", "second review"]);
        assert!(prompt.contains("first review\n\nsecond review"));
        assert!(!prompt.contains("-- "));
        assert!(prompt.contains("bullet-point"));
    }

    #[tokio::test]
    async fn test_single_completion_per_aggregation() {
        let recorder = Arc::new(Recorder::default());
        let aggregator = Aggregator::new(recorder.clone());

        let plan = aggregator.action_plan(&sample_reviews()).await.unwrap();
        assert_eq!(plan, "plan");

        let digest = aggregator
            .bullet_summary(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(digest, "plan");

        assert_eq!(recorder.prompts.lock().unwrap().len(), 2);
    }
}
