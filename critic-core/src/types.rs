//! Request-scoped data types.
//!
//! Nothing here outlives the request that produced it: values are derived,
//! used to build prompts or responses, and dropped.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::persona::Persona;

/// An owner/name pair identifying a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::repo_url::parse_github_url(s)
    }
}

/// Paths of reviewable files in upstream listing order.
pub type FileListing = Vec<String>;

/// Names collected from one scan of a Python source file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeStructure {
    /// Dotted import targets as written, e.g. `os.path` or `typing.List`.
    pub imports: Vec<String>,
    /// Class names in encounter order.
    pub classes: Vec<String>,
    /// Function names in encounter order.
    pub functions: Vec<String>,
}

impl CodeStructure {
    /// Distinct root packages of the imports, sorted.
    pub fn root_modules(&self) -> BTreeSet<&str> {
        self.imports
            .iter()
            .map(|import| import.split('.').next().unwrap_or(import))
            .collect()
    }

    /// Render the one-paragraph synopsis.
    ///
    /// At most three sentences, imports then classes then functions, each
    /// omitted when its list is empty.
    pub fn summary(&self) -> String {
        let mut parts = Vec::with_capacity(3);

        if !self.imports.is_empty() {
            let roots: Vec<&str> = self.root_modules().into_iter().collect();
            parts.push(format!("Imports: {}.", roots.join(", ")));
        }
        if !self.classes.is_empty() {
            parts.push(format!("Defines classes: {}.", self.classes.join(", ")));
        }
        if !self.functions.is_empty() {
            parts.push(format!("Defines functions: {}.", self.functions.join(", ")));
        }

        parts.join(" ")
    }
}

/// One persona's critique.
#[derive(Clone, Debug)]
pub struct Review {
    pub persona: &'static Persona,
    pub text: String,
}

/// Critiques keyed by persona, kept in the order the personas were requested.
#[derive(Clone, Debug, Default)]
pub struct ReviewSet {
    reviews: Vec<Review>,
}

impl ReviewSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, persona: &'static Persona, text: String) {
        match self.reviews.iter_mut().find(|r| r.persona.key == persona.key) {
            Some(existing) => existing.text = text,
            None => self.reviews.push(Review { persona, text }),
        }
    }

    /// Critique text for a persona key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.reviews
            .iter()
            .find(|r| r.persona.key == key)
            .map(|r| r.text.as_str())
    }

    /// Critique text for a persona key, or an empty string if absent.
    pub fn text(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Review> {
        self.reviews.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.reviews.iter().map(|r| r.persona.key)
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}

impl FromIterator<(&'static Persona, String)> for ReviewSet {
    fn from_iter<I: IntoIterator<Item = (&'static Persona, String)>>(iter: I) -> Self {
        let mut set = ReviewSet::new();
        for (persona, text) in iter {
            set.insert(persona, text);
        }
        set
    }
}
