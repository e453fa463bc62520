//! Error taxonomy shared by every critic component.

use thiserror::Error;

/// Result type alias for critic operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a review request.
///
/// No variant is recovered from locally: each one surfaces to the request
/// handler, which maps it to an HTTP status via [`Error::status_code`].
#[derive(Error, Debug)]
pub enum Error {
    /// The supplied string is not a usable GitHub repository URL.
    #[error("Invalid repository URL: {0}")]
    InvalidRepositoryUrl(String),

    /// The hosting platform reported the repository as missing.
    #[error("Repository not found: {owner}/{name}")]
    RepositoryNotFound {
        /// Repository owner.
        owner: String,
        /// Repository name.
        name: String,
    },

    /// The requested file does not exist on the requested branch.
    #[error("File not found in branch '{branch}': {path}")]
    FileNotFound {
        /// Path relative to the repository root.
        path: String,
        /// Branch the lookup was made against.
        branch: String,
    },

    /// The recursive tree listing was refused by the hosting platform.
    #[error("Repository too large to list recursively: {owner}/{name}")]
    RepositoryTooLarge {
        /// Repository owner.
        owner: String,
        /// Repository name.
        name: String,
    },

    /// An outbound call failed. `status` is `None` when no HTTP response
    /// was received at all (connect error, timeout, unreadable body).
    #[error("{service} request failed: {message}")]
    Upstream {
        /// Which collaborator failed ("github" or "anthropic").
        service: &'static str,
        /// Upstream HTTP status, if any.
        status: Option<u16>,
        /// Description of the failure.
        message: String,
    },

    /// The completion envelope did not have the expected shape.
    #[error("Malformed completion response: {0}")]
    MalformedCompletion(String),

    /// A persona key outside the catalog was requested.
    #[error("Unknown persona: {0}")]
    UnknownPersona(String),
}

impl Error {
    /// HTTP status this error maps to at the service boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidRepositoryUrl(_) => 400,
            Error::RepositoryNotFound { .. } | Error::FileNotFound { .. } => 404,
            Error::RepositoryTooLarge { .. } => 400,
            Error::Upstream { status, .. } => match status {
                Some(code) if (400..=599).contains(code) => *code,
                _ => 502,
            },
            Error::MalformedCompletion(_) => 500,
            Error::UnknownPersona(_) => 400,
        }
    }

    /// Stable machine-readable identifier for the error body.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidRepositoryUrl(_) => "invalid_repository_url",
            Error::RepositoryNotFound { .. } => "repository_not_found",
            Error::FileNotFound { .. } => "file_not_found",
            Error::RepositoryTooLarge { .. } => "repository_too_large",
            Error::Upstream { .. } => "upstream_error",
            Error::MalformedCompletion(_) => "malformed_completion",
            Error::UnknownPersona(_) => "unknown_persona",
        }
    }

    /// Shorthand for an upstream failure that carries an HTTP status.
    pub fn upstream(service: &'static str, status: u16, message: impl Into<String>) -> Self {
        Error::Upstream {
            service,
            status: Some(status),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_faults_map_to_4xx() {
        assert_eq!(Error::InvalidRepositoryUrl("x".into()).status_code(), 400);
        assert_eq!(
            Error::RepositoryTooLarge {
                owner: "o".into(),
                name: "r".into()
            }
            .status_code(),
            400
        );
        assert_eq!(
            Error::FileNotFound {
                path: "a.py".into(),
                branch: "main".into()
            }
            .status_code(),
            404
        );
    }

    #[test]
    fn test_upstream_status_passthrough() {
        assert_eq!(Error::upstream("github", 403, "rate limited").status_code(), 403);
        assert_eq!(Error::upstream("anthropic", 529, "overloaded").status_code(), 529);
        assert_eq!(Error::upstream("github", 302, "redirect").status_code(), 502);

        let transport = Error::Upstream {
            service: "anthropic",
            status: None,
            message: "timed out".into(),
        };
        assert_eq!(transport.status_code(), 502);
        assert_eq!(transport.kind(), "upstream_error");
    }

    #[test]
    fn test_malformed_completion_is_server_fault() {
        let err = Error::MalformedCompletion("missing content".into());
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("missing content"));
    }
}
