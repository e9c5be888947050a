//! GitHub Contents API client.
//!
//! Commits captured markdown to a repository via
//! `PUT /repos/{owner}/{repo}/contents/{path}` with base64-encoded
//! content. Updating an existing file requires its current blob `sha`
//! (the API's optimistic-concurrency check), so the client always fetches
//! the path before writing — fetch-then-write, never blind-write.
//!
//! Rate-limit and authentication failures surface as distinguishable
//! error variants; nothing is retried automatically.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::{PrismError, Result};

const API_BASE: &str = "https://api.github.com";
const ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = "prismweave/1.0";

/// Target repository and credentials for commits.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub owner: String,
    pub repo: String,
    /// Personal Access Token with the `contents` scope.
    pub token: String,
    /// Target branch; the repository default when `None`.
    pub branch: Option<String>,
}

impl GitHubConfig {
    /// Build a config from an `owner/repo` slug.
    ///
    /// Validates the slug shape and the token presence before any network
    /// call is attempted.
    pub fn from_slug(slug: &str, token: &str, branch: Option<String>) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(PrismError::Validation("GitHub token is required".to_string()));
        }

        let (owner, repo) = split_slug(slug)?;
        Ok(Self { owner, repo, token: token.to_string(), branch })
    }
}

/// Split and validate an `owner/repo` slug.
pub fn split_slug(slug: &str) -> Result<(String, String)> {
    let re = Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").unwrap();
    if !re.is_match(slug) {
        return Err(PrismError::Validation(format!(
            "repository must be in owner/repo format, got {:?}",
            slug
        )));
    }

    let (owner, repo) = slug.split_once('/').unwrap();
    Ok((owner.to_string(), repo.to_string()))
}

/// The result of a successful Contents API write.
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    /// Blob sha of the committed content.
    pub sha: String,
    /// Repository-relative path of the file.
    pub path: String,
    /// Web URL of the committed file, when the API returned one.
    pub html_url: Option<String>,
    /// Whether an existing file was updated rather than created.
    pub updated: bool,
}

#[derive(Serialize)]
struct ContentsRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

/// Client for the GitHub Contents API.
pub struct GitHubClient {
    http: Client,
    config: GitHubConfig,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let http = Client::builder().build().map_err(PrismError::HttpError)?;
        Ok(Self { http, config })
    }

    /// The repository this client commits to, as `owner/repo`.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.config.owner, self.config.repo)
    }

    fn contents_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!(
            "{}/repos/{}/{}/contents/{}",
            API_BASE, self.config.owner, self.config.repo, path
        )
    }

    /// Fetch the current blob sha of a path, `None` if the file is absent.
    pub async fn fetch_sha(&self, path: &str) -> Result<Option<String>> {
        let mut request = self
            .http
            .get(self.contents_url(path))
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .header("Authorization", format!("Bearer {}", self.config.token));

        if let Some(branch) = &self.config.branch {
            request = request.query(&[("ref", branch.as_str())]);
        }

        let response = request.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        let body: Value = response.json().await?;
        Ok(body.get("sha").and_then(Value::as_str).map(str::to_string))
    }

    /// Commit a file, creating it or updating it in place.
    ///
    /// Fetches the existing sha first so updates carry the concurrency
    /// token the API requires.
    pub async fn commit_file(&self, path: &str, content: &str, message: &str) -> Result<CommitOutcome> {
        let existing_sha = self.fetch_sha(path).await?;
        let updated = existing_sha.is_some();

        let request = ContentsRequest {
            message,
            content: BASE64.encode(content.as_bytes()),
            sha: existing_sha,
            branch: self.config.branch.as_deref(),
        };

        let response = self
            .http
            .put(self.contents_url(path))
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .header("Authorization", format!("Bearer {}", self.config.token))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        let body: Value = response.json().await?;
        let content = body.get("content").cloned().unwrap_or(Value::Null);

        Ok(CommitOutcome {
            sha: content.get("sha").and_then(Value::as_str).unwrap_or_default().to_string(),
            path: content
                .get("path")
                .and_then(Value::as_str)
                .unwrap_or(path)
                .to_string(),
            html_url: content.get("html_url").and_then(Value::as_str).map(str::to_string),
            updated,
        })
    }
}

/// Map a failed API response to the error taxonomy.
async fn error_from_response(response: reqwest::Response) -> PrismError {
    let status = response.status().as_u16();
    let rate_remaining = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "request failed".to_string());

    classify_error(status, rate_remaining.as_deref(), message)
}

/// Pure classification of an API failure by status and rate-limit header.
fn classify_error(status: u16, rate_remaining: Option<&str>, message: String) -> PrismError {
    match status {
        401 => PrismError::AuthError,
        429 => PrismError::RateLimited,
        403 if rate_remaining == Some("0") => PrismError::RateLimited,
        _ => PrismError::ApiError { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_slug_valid() {
        let (owner, repo) = split_slug("testuser/testrepo").unwrap();
        assert_eq!(owner, "testuser");
        assert_eq!(repo, "testrepo");
    }

    #[test]
    fn test_split_slug_invalid() {
        assert!(split_slug("not-a-slug").is_err());
        assert!(split_slug("a/b/c").is_err());
        assert!(split_slug("/repo").is_err());
        assert!(split_slug("owner/").is_err());
        assert!(split_slug("").is_err());
    }

    #[test]
    fn test_config_requires_token() {
        let result = GitHubConfig::from_slug("user/repo", "", None);
        assert!(matches!(result, Err(PrismError::Validation(_))));
    }

    #[test]
    fn test_contents_url() {
        let config = GitHubConfig::from_slug("user/notes", "ghp_test", None).unwrap();
        let client = GitHubClient::new(config).unwrap();

        assert_eq!(
            client.contents_url("captures/post.md"),
            "https://api.github.com/repos/user/notes/contents/captures/post.md"
        );
        assert_eq!(
            client.contents_url("/leading-slash.md"),
            "https://api.github.com/repos/user/notes/contents/leading-slash.md"
        );
    }

    #[test]
    fn test_classify_auth_error() {
        assert!(matches!(
            classify_error(401, None, "Bad credentials".to_string()),
            PrismError::AuthError
        ));
    }

    #[test]
    fn test_classify_rate_limit() {
        assert!(matches!(
            classify_error(429, None, "too many requests".to_string()),
            PrismError::RateLimited
        ));
        assert!(matches!(
            classify_error(403, Some("0"), "rate limit exceeded".to_string()),
            PrismError::RateLimited
        ));
    }

    #[test]
    fn test_classify_forbidden_with_quota_left_is_api_error() {
        let err = classify_error(403, Some("42"), "Resource not accessible".to_string());
        assert!(matches!(err, PrismError::ApiError { status: 403, .. }));
    }

    #[test]
    fn test_classify_generic_api_error() {
        let err = classify_error(422, None, "Invalid request".to_string());
        match err {
            PrismError::ApiError { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Invalid request");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_content_is_base64_encoded() {
        let request = ContentsRequest {
            message: "Add capture",
            content: BASE64.encode("# Hello".as_bytes()),
            sha: None,
            branch: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["content"], "IyBIZWxsbw==");
        assert!(json.get("sha").is_none());
        assert!(json.get("branch").is_none());
    }

    #[test]
    fn test_update_request_carries_sha() {
        let request = ContentsRequest {
            message: "Update capture",
            content: BASE64.encode(b"body"),
            sha: Some("abc123".to_string()),
            branch: Some("main"),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["sha"], "abc123");
        assert_eq!(json["branch"], "main");
    }
}
