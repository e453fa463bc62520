//! The fixed catalog of reviewer personas.
//!
//! Personas are plain data: a key, a display label, the role the model is
//! asked to play and the instruction it is given. Selecting a panel is a
//! filter over catalog keys.

use serde::Serialize;

use crate::error::{Error, Result};

/// A named reviewer role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Persona {
    /// Stable identifier used in requests and response fields.
    pub key: &'static str,
    /// Heading used when critiques are labelled for aggregation.
    #[serde(skip)]
    pub label: &'static str,
    pub role: &'static str,
    pub instruction: &'static str,
}

/// Every persona, in presentation order.
pub static CATALOG: &[Persona] = &[
    Persona {
        key: "security",
        label: "Security",
        role: "security auditor",
        instruction: "review this code for vulnerabilities",
    },
    Persona {
        key: "ux",
        label: "UX",
        role: "UX designer",
        instruction: "critique readability and maintainability of this code",
    },
    Persona {
        key: "performance",
        label: "Performance",
        role: "performance engineer",
        instruction: "suggest optimizations for this code",
    },
    Persona {
        key: "test",
        label: "Test",
        role: "test engineer",
        instruction: "identify missing test coverage and propose test cases for this code",
    },
    Persona {
        key: "ethics",
        label: "Ethics",
        role: "technology ethicist",
        instruction: "assess this code for privacy, fairness and misuse concerns",
    },
    Persona {
        key: "architecture",
        label: "Architecture",
        role: "software architect",
        instruction: "evaluate the structure, modularity and design of this code",
    },
    Persona {
        key: "documentation",
        label: "Documentation",
        role: "technical writer",
        instruction: "review the comments, docstrings and naming of this code",
    },
];

/// Panel used by the debate and condensed-summary operations.
pub const DEBATE_PANEL: &[&str] = &[
    "security",
    "ux",
    "performance",
    "test",
    "architecture",
    "documentation",
];

/// Find a persona by key.
pub fn lookup(key: &str) -> Result<&'static Persona> {
    CATALOG
        .iter()
        .find(|p| p.key == key)
        .ok_or_else(|| Error::UnknownPersona(key.to_string()))
}

/// Keys of the whole catalog, in catalog order.
pub fn all_keys() -> Vec<&'static str> {
    CATALOG.iter().map(|p| p.key).collect()
}

/// Resolve a list of keys, failing on the first unknown one.
pub fn select(keys: &[&str]) -> Result<Vec<&'static Persona>> {
    keys.iter().map(|key| lookup(key)).collect()
}
