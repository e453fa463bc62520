//! critic core - everything in a review request that does not touch the network.
//!
//! # Features
//!
//! - **Repository URLs**: validate a GitHub URL and split it into owner/name
//! - **Structure summaries**: a tree-sitter scan of Python source describing
//!   its imports, classes and functions in one paragraph
//! - **Persona catalog**: the fixed table of reviewer roles and instructions
//! - **Error taxonomy**: the errors every layer reports, with their HTTP mapping
//!
//! # Usage
//!
//! ```
//! use critic_core::{parse_github_url, parser, persona};
//!
//! let repo = parse_github_url("https://github.com/octocat/Hello-World.git").unwrap();
//! assert_eq!(repo.name, "Hello-World");
//!
//! let summary = parser::summarize("import os\n\ndef main():\n    pass\n");
//! assert_eq!(summary, "Imports: os. Defines functions: main.");
//!
//! assert_eq!(persona::lookup("ux").unwrap().role, "UX designer");
//! ```

pub mod error;
pub mod parser;
pub mod persona;
pub mod repo_url;
pub mod types;

pub use error::{Error, Result};
pub use persona::Persona;
pub use repo_url::parse_github_url;
pub use types::{CodeStructure, FileListing, RepositoryRef, Review, ReviewSet};
