//! GitHub repository URL validation.

use url::Url;

use crate::error::{Error, Result};
use crate::types::RepositoryRef;

/// Hosts accepted as GitHub, compared case-insensitively.
const GITHUB_HOSTS: &[&str] = &["github.com", "www.github.com"];

/// Parse a GitHub repository URL into an owner/name pair.
///
/// Accepts `http`/`https` URLs on `github.com` (optionally `www.`) whose path
/// starts with `/{owner}/{repo}`. Further path segments (`/tree/main/...`)
/// are ignored and a trailing `.git` on the repository name is stripped.
pub fn parse_github_url(input: &str) -> Result<RepositoryRef> {
    let url = Url::parse(input.trim())
        .map_err(|e| Error::InvalidRepositoryUrl(format!("Not a valid URL: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(not_github());
    }

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    if !GITHUB_HOSTS.contains(&host.as_str())
        || !url.username().is_empty()
        || url.password().is_some()
        || url.port().is_some()
    {
        return Err(not_github());
    }

    let mut segments = url.path().trim_matches('/').split('/');
    let owner = segments.next().unwrap_or_default();
    let name = segments.next().ok_or_else(invalid_repo)?;
    let name = strip_git_suffix(name);

    if owner.is_empty() || name.is_empty() {
        return Err(invalid_repo());
    }

    Ok(RepositoryRef::new(owner, name))
}

fn strip_git_suffix(name: &str) -> &str {
    match name.len().checked_sub(4).and_then(|at| name.get(at..).map(|tail| (at, tail))) {
        Some((at, tail)) if tail.eq_ignore_ascii_case(".git") => &name[..at],
        _ => name,
    }
}

fn not_github() -> Error {
    Error::InvalidRepositoryUrl("Only GitHub URLs are supported".to_string())
}

fn invalid_repo() -> Error {
    Error::InvalidRepositoryUrl("Invalid GitHub repo URL".to_string())
}
