//! Source structure summaries.
//!
//! Only Python is summarized. The summary is advisory metadata for prompts,
//! so parse failures degrade to an empty string instead of an error.

pub mod python;

mod helpers;

pub use python::{extract_structure, summarize};
