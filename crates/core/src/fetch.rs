//! Page fetching from URLs, files, and stdin.
//!
//! This module provides functions for retrieving page HTML from the
//! sources the CLI capture surface supports: HTTP/HTTPS URLs, local
//! files, and standard input.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::{PrismError, Result};

/// HTTP client configuration for fetching web pages.
///
/// Controls timeout and user agent settings for page requests. The
/// timeout comes from the `capture_timeout` setting when the CLI drives a
/// capture.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (compatible; PrismWeave/1.0; +https://github.com/prismweave/prismweave)"
                .to_string(),
        }
    }
}

/// Fetches page HTML from a URL.
///
/// Performs an HTTP GET, follows redirects, respects the configured
/// timeout, and sends a browser-like Accept header for better
/// compatibility with content-negotiating sites.
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = Url::parse(url).map_err(|e| PrismError::InvalidUrl(e.to_string()))?;

    if parsed_url.scheme() != "http" && parsed_url.scheme() != "https" {
        return Err(PrismError::InvalidUrl(
            "URL must use http:// or https://".to_string(),
        ));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(PrismError::HttpError)?;

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                PrismError::Timeout { timeout: config.timeout }
            } else {
                PrismError::HttpError(e)
            }
        })?;

    let content = response.text().await?;

    Ok(content)
}

/// Reads page HTML from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(PrismError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(PrismError::from)
    }
}

/// Reads page HTML from standard input.
///
/// Reads all available input until EOF. Useful for piping content from
/// other commands.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(PrismError::from)?;

    Ok(buffer)
}
