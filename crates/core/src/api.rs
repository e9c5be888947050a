//! REST client for the visualization backend.
//!
//! [`ApiClient`] wraps the article CRUD endpoints; [`ArticleStore`] adds
//! the state contract the visualization UI relies on: every action sets
//! the loading flag and clears the prior error, failures are recorded as
//! human-readable strings, read actions swallow their error after
//! recording it while mutating actions re-raise it, and caches are
//! replaced wholesale from server responses.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{PrismError, Result};

/// Server-owned article listing record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleSummary {
    pub id: String,
    pub title: String,
    pub path: String,
    pub domain: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub captured_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(default)]
    pub word_count: usize,
}

/// Full article record, summary plus markdown body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub summary: ArticleSummary,
    pub body: String,
}

/// Shallow patch sent to `PUT /api/articles/{id}`.
///
/// Absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArticlePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Listing filters accepted by `GET /api/articles`.
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub domain: Option<String>,
    pub tag: Option<String>,
    /// Substring match against title and body.
    pub query: Option<String>,
}

impl ArticleFilter {
    fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(domain) = &self.domain {
            pairs.push(("domain", domain.as_str()));
        }
        if let Some(tag) = &self.tag {
            pairs.push(("tag", tag.as_str()));
        }
        if let Some(query) = &self.query {
            pairs.push(("q", query.as_str()));
        }
        pairs
    }
}

/// Result of a library rebuild.
#[derive(Debug, Clone, Deserialize)]
pub struct RebuildReport {
    pub articles: usize,
}

/// HTTP client for the visualization REST API.
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder().build().map_err(PrismError::HttpError)?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn fetch_articles(&self, filter: &ArticleFilter) -> Result<Vec<ArticleSummary>> {
        let response = self
            .http
            .get(self.url("/api/articles"))
            .query(&filter.query_pairs())
            .send()
            .await?;
        Self::decode(response, None).await
    }

    pub async fn fetch_article(&self, id: &str) -> Result<ArticleDetail> {
        let response = self.http.get(self.url(&format!("/api/articles/{}", id))).send().await?;
        Self::decode(response, Some(id)).await
    }

    pub async fn update_article(&self, id: &str, patch: &ArticlePatch) -> Result<ArticleDetail> {
        let response = self
            .http
            .put(self.url(&format!("/api/articles/{}", id)))
            .json(patch)
            .send()
            .await?;
        Self::decode(response, Some(id)).await
    }

    pub async fn delete_article(&self, id: &str) -> Result<()> {
        let response = self.http.delete(self.url(&format!("/api/articles/{}", id))).send().await?;
        Self::check(response, Some(id)).await
    }

    pub async fn rebuild(&self) -> Result<RebuildReport> {
        let response = self.http.post(self.url("/api/visualization/rebuild")).send().await?;
        Self::decode(response, None).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response, id: Option<&str>) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::api_error(status, response, id).await);
        }
        Ok(response.json::<T>().await?)
    }

    async fn check(response: reqwest::Response, id: Option<&str>) -> Result<()> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::api_error(status, response, id).await);
        }
        Ok(())
    }

    async fn api_error(status: StatusCode, response: reqwest::Response, id: Option<&str>) -> PrismError {
        if status == StatusCode::NOT_FOUND
            && let Some(id) = id
        {
            return PrismError::ArticleNotFound(id.to_string());
        }

        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| "request failed".to_string());

        PrismError::ApiError { status: status.as_u16(), message }
    }
}

/// Article cache with the UI state contract.
pub struct ArticleStore {
    client: ApiClient,
    /// Last fetched listing, replaced wholesale on every fetch.
    pub articles: Vec<ArticleSummary>,
    /// Last fetched detail.
    pub current: Option<ArticleDetail>,
    /// An action is in flight.
    pub loading: bool,
    /// Human-readable error from the last failed action.
    pub error: Option<String>,
}

impl ArticleStore {
    pub fn new(client: ApiClient) -> Self {
        Self { client, articles: Vec::new(), current: None, loading: false, error: None }
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Fetch the article listing. Failures are recorded, not raised.
    pub async fn fetch_articles(&mut self, filter: &ArticleFilter) {
        self.begin();
        match self.client.fetch_articles(filter).await {
            Ok(articles) => self.articles = articles,
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
    }

    /// Fetch one article. Failures are recorded, not raised.
    pub async fn fetch_article(&mut self, id: &str) {
        self.begin();
        match self.client.fetch_article(id).await {
            Ok(detail) => self.current = Some(detail),
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
    }

    /// Update an article. Failures are recorded and re-raised so the
    /// caller can react.
    pub async fn update_article(&mut self, id: &str, patch: &ArticlePatch) -> Result<ArticleDetail> {
        self.begin();
        let result = self.client.update_article(id, patch).await;
        self.loading = false;

        match result {
            Ok(detail) => {
                patch_summary(&mut self.articles, &detail.summary);
                self.current = Some(detail.clone());
                Ok(detail)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Delete an article. Failures are recorded and re-raised.
    pub async fn delete_article(&mut self, id: &str) -> Result<()> {
        self.begin();
        let result = self.client.delete_article(id).await;
        self.loading = false;

        match result {
            Ok(()) => {
                self.articles.retain(|a| a.id != id);
                if self.current.as_ref().is_some_and(|c| c.summary.id == id) {
                    self.current = None;
                }
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Rebuild the library index. Failures are recorded and re-raised.
    pub async fn rebuild(&mut self) -> Result<RebuildReport> {
        self.begin();
        let result = self.client.rebuild().await;
        self.loading = false;

        result.inspect_err(|e| self.error = Some(e.to_string()))
    }
}

/// Shallow-patch a summary already present in the listing cache.
///
/// The listing is otherwise only replaced wholesale from the server.
fn patch_summary(articles: &mut [ArticleSummary], updated: &ArticleSummary) {
    if let Some(existing) = articles.iter_mut().find(|a| a.id == updated.id) {
        *existing = updated.clone();
    }
}
