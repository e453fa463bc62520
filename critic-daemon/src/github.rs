//! GitHub repository client.
//!
//! Three calls, each a single request with no retry: repository metadata
//! (default branch), a recursive tree listing, and a raw file download.
//! Branches and paths are appended segment by segment so characters such
//! as `#` or `?` in a file name stay part of the path. The access token is
//! only sent to the REST API, never to the raw-content host.

use critic_core::{Error, FileListing, RepositoryRef, Result};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::GithubSettings;

/// Only files with this suffix are listed.
pub const SOURCE_SUFFIX: &str = ".py";

/// Branch assumed when metadata does not declare one.
pub const FALLBACK_BRANCH: &str = "main";

const SERVICE: &str = "github";

#[derive(Deserialize)]
struct RepoMetadata {
    default_branch: Option<String>,
}

#[derive(Deserialize)]
struct TreeListing {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct TreeEntry {
    #[serde(default)]
    path: String,
    #[serde(rename = "type", default)]
    kind: String,
    size: Option<u64>,
}

impl TreeEntry {
    fn is_listed(&self, max_size_bytes: u64) -> bool {
        self.kind == "blob"
            && self.path.ends_with(SOURCE_SUFFIX)
            && self.size.unwrap_or(0) < max_size_bytes
    }
}

/// Client for the GitHub REST and raw-content endpoints.
pub struct RepositoryClient {
    http: reqwest::Client,
    settings: GithubSettings,
}

impl RepositoryClient {
    pub fn new(settings: GithubSettings) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("critic-daemon/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, settings })
    }

    /// Listing ceiling configured for this client.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.settings.max_file_size_bytes
    }

    /// Resolve the repository's default branch.
    pub async fn default_branch(&self, repo: &RepositoryRef) -> Result<String> {
        let url = join_segments(
            &self.settings.api_url,
            ["repos", repo.owner.as_str(), repo.name.as_str()],
        )?;
        debug!(repo = %repo, "Resolving default branch");

        let resp = self.send(self.api_get(url)).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Error::RepositoryNotFound {
                owner: repo.owner.clone(),
                name: repo.name.clone(),
            });
        }
        let resp = ensure_success(resp).await?;

        let metadata: RepoMetadata = resp.json().await.map_err(decode_error)?;
        Ok(metadata
            .default_branch
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string()))
    }

    /// List source files on `branch` smaller than `max_size_bytes`, in the
    /// order GitHub returns them.
    pub async fn list_matching_files(
        &self,
        repo: &RepositoryRef,
        branch: &str,
        max_size_bytes: u64,
    ) -> Result<FileListing> {
        let url = join_segments(
            &self.settings.api_url,
            ["repos", repo.owner.as_str(), repo.name.as_str(), "git", "trees"]
                .into_iter()
                .chain(path_segments(branch)),
        )?;
        debug!(repo = %repo, branch, "Listing repository tree");

        let resp = self
            .send(self.api_get(url).query(&[("recursive", "1")]))
            .await?;
        if resp.status() == StatusCode::CONFLICT {
            return Err(Error::RepositoryTooLarge {
                owner: repo.owner.clone(),
                name: repo.name.clone(),
            });
        }
        let resp = ensure_success(resp).await?;

        let listing: TreeListing = resp.json().await.map_err(decode_error)?;
        if listing.truncated {
            warn!(repo = %repo, branch, "Tree listing was truncated by GitHub");
        }

        Ok(listing
            .tree
            .into_iter()
            .filter(|entry| entry.is_listed(max_size_bytes))
            .map(|entry| entry.path)
            .collect())
    }

    /// Download one file verbatim.
    ///
    /// Paths with `.` or `..` segments cannot name a file in the repository
    /// and are reported as not found without a request.
    pub async fn fetch_file_content(
        &self,
        repo: &RepositoryRef,
        branch: &str,
        path: &str,
    ) -> Result<String> {
        let not_found = || Error::FileNotFound {
            path: path.to_string(),
            branch: branch.to_string(),
        };
        if path_segments(branch)
            .chain(path_segments(path))
            .any(|segment| segment == "." || segment == "..")
        {
            return Err(not_found());
        }

        let url = join_segments(
            &self.settings.raw_url,
            [repo.owner.as_str(), repo.name.as_str()]
                .into_iter()
                .chain(path_segments(branch))
                .chain(path_segments(path)),
        )?;
        debug!(repo = %repo, branch, path, "Fetching file content");

        let resp = self.send(self.http.get(url)).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(not_found());
        }
        let resp = ensure_success(resp).await?;

        resp.text().await.map_err(decode_error)
    }

    fn api_get(&self, url: Url) -> RequestBuilder {
        self.authorized(
            self.http
                .get(url)
                .header("Accept", "application/vnd.github.v3+json"),
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.settings.token {
            Some(token) => request.header("Authorization", format!("token {}", token)),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request.send().await.map_err(|e| {
            warn!(error = %e, "GitHub request failed");
            Error::Upstream {
                service: SERVICE,
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            }
        })
    }
}

/// Split a slash-separated branch or file path into URL segments.
fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Append `segments` to `base`, percent-encoding each one.
fn join_segments<'a>(base: &str, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
    let invalid = |reason: String| Error::Upstream {
        service: SERVICE,
        status: None,
        message: format!("Invalid base URL '{}': {}", base, reason),
    };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Turn any non-2xx response into an upstream error carrying its status.
async fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "GitHub returned an error");
    Err(Error::upstream(
        SERVICE,
        status.as_u16(),
        format!("HTTP {}: {}", status, body.trim()),
    ))
}

fn decode_error(e: reqwest::Error) -> Error {
    Error::Upstream {
        service: SERVICE,
        status: None,
        message: format!("Unreadable response: {}", e),
    }
}

impl std::fmt::Debug for RepositoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryClient")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, kind: &str, size: Option<u64>) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            kind: kind.to_string(),
            size,
        }
    }

    #[test]
    fn test_entry_filter() {
        let max = 100 * 1024;
        assert!(entry("main.py", "blob", Some(10)).is_listed(max));
        assert!(entry("pkg/mod.py", "blob", None).is_listed(max));
        assert!(!entry("README.md", "blob", Some(5)).is_listed(max));
        assert!(!entry("pkg.py", "tree", None).is_listed(max));
        assert!(!entry("big.py", "blob", Some(max)).is_listed(max));
        assert!(entry("almost.py", "blob", Some(max - 1)).is_listed(max));
    }

    #[test]
    fn test_segments_are_percent_encoded() {
        let url = join_segments(
            "https://raw.githubusercontent.com",
            ["octocat", "Hello-World"]
                .into_iter()
                .chain(path_segments("feature/login"))
                .chain(path_segments("docs/notes#1 what?.py")),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://raw.githubusercontent.com/octocat/Hello-World/feature/login/docs/notes%231%20what%3F.py"
        );
        assert!(url.fragment().is_none());
        assert!(url.query().is_none());
    }

    #[test]
    fn test_join_keeps_base_path() {
        let url = join_segments("http://127.0.0.1:9000/raw", ["o", "r"]).unwrap();
        assert_eq!(url.path(), "/raw/o/r");

        let url = join_segments("https://api.github.com", ["repos", "o", "r"]).unwrap();
        assert_eq!(url.path(), "/repos/o/r");
    }

    #[test]
    fn test_unusable_base_is_upstream_error() {
        let err = join_segments("not a url", ["repos"]).unwrap_err();
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn test_tree_listing_decodes_github_shape() {
        let json = r#"{
            "sha": "abc",
            "tree": [
                {"path": "src", "mode": "040000", "type": "tree", "sha": "1"},
                {"path": "src/app.py", "mode": "100644", "type": "blob", "sha": "2", "size": 42}
            ],
            "truncated": false
        }"#;
        let listing: TreeListing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.tree.len(), 2);
        assert_eq!(listing.tree[1].size, Some(42));
        assert!(!listing.truncated);
    }
}
