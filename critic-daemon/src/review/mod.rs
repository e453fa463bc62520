//! Persona reviews and their aggregation.

mod aggregate;
mod engine;

pub use aggregate::{action_plan_prompt, bullet_summary_prompt, Aggregator};
pub use engine::{persona_prompt, ReviewEngine};
