//! critic daemon - multi-persona LLM code review over HTTP.
//!
//! This library provides:
//! - GitHub client (default branch, recursive listing, raw file content)
//! - LLM completion client behind the [`llm::Completer`] trait
//! - Persona review engine with fail-fast fan-out, and the aggregator
//! - The axum router exposing the review operations

pub mod config;
pub mod github;
pub mod llm;
pub mod review;
pub mod server;
