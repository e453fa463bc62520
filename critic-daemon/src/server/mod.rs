//! HTTP server for the critic daemon.
//!
//! Provides the JSON API for:
//! - Listing reviewable files in a repository
//! - Full seven-persona reviews with an action plan
//! - Ad-hoc debates on pasted code
//! - Condensed bullet summaries

mod error;
mod http;
pub mod state;

pub use error::ApiError;
pub use http::create_router;
pub use state::AppState;
