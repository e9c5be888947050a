//! Filesystem-backed article library.
//!
//! Captured documents live as markdown files with frontmatter under a
//! library directory (typically a working copy of the capture
//! repository). The library scans that tree into server-owned article
//! records; ids are stable UUIDs derived from each file's relative path,
//! so a rescan preserves identities.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;
use uuid::Uuid;

use crate::error::ApiError;

/// Listing record served by `GET /api/articles`.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleSummary {
    pub id: Uuid,
    pub title: String,
    /// Library-relative file path.
    pub path: String,
    pub domain: Option<String>,
    pub tags: Vec<String>,
    pub captured_at: Option<String>,
    pub updated_at: Option<String>,
    pub word_count: usize,
}

/// Full record served by `GET /api/articles/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub summary: ArticleSummary,
    /// Markdown body without the frontmatter block.
    pub body: String,
}

/// Shallow patch accepted by `PUT /api/articles/{id}`.
///
/// Absent fields leave the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub body: Option<String>,
}

/// Listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleFilter {
    pub domain: Option<String>,
    pub tag: Option<String>,
    /// Substring match against title and body, case-insensitive.
    pub q: Option<String>,
}

/// The scanned article library.
pub struct Library {
    root: PathBuf,
    entries: BTreeMap<Uuid, ArticleSummary>,
}

impl Library {
    /// Open a library rooted at `root` and scan it.
    pub fn open(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let mut library = Self { root: root.as_ref().to_path_buf(), entries: BTreeMap::new() };
        library.rebuild()?;
        Ok(library)
    }

    /// Number of known articles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rescan the library directory, replacing the in-memory index.
    pub fn rebuild(&mut self) -> std::io::Result<usize> {
        let mut entries = BTreeMap::new();

        if self.root.is_dir() {
            let mut files = Vec::new();
            collect_markdown_files(&self.root, &mut files)?;

            for file in files {
                let relative = file
                    .strip_prefix(&self.root)
                    .unwrap_or(&file)
                    .to_string_lossy()
                    .replace('\\', "/");
                let content = fs::read_to_string(&file)?;
                let summary = summarize(&relative, &content);
                entries.insert(summary.id, summary);
            }
        }

        self.entries = entries;
        Ok(self.entries.len())
    }

    /// List articles matching the filter, newest capture first.
    pub fn list(&self, filter: &ArticleFilter) -> Vec<ArticleSummary> {
        let mut articles: Vec<ArticleSummary> = self
            .entries
            .values()
            .filter(|a| self.matches(a, filter))
            .cloned()
            .collect();

        articles.sort_by(|a, b| b.captured_at.cmp(&a.captured_at).then_with(|| a.path.cmp(&b.path)));
        articles
    }

    fn matches(&self, article: &ArticleSummary, filter: &ArticleFilter) -> bool {
        if let Some(domain) = &filter.domain
            && article.domain.as_deref() != Some(domain.as_str())
        {
            return false;
        }

        if let Some(tag) = &filter.tag
            && !article.tags.iter().any(|t| t == tag)
        {
            return false;
        }

        if let Some(q) = &filter.q {
            let needle = q.to_lowercase();
            let in_title = article.title.to_lowercase().contains(&needle);
            let in_body = self
                .read_document(article)
                .map(|(_, body)| body.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_body {
                return false;
            }
        }

        true
    }

    /// Full article record, body included.
    pub fn detail(&self, id: Uuid) -> Result<ArticleDetail, ApiError> {
        let summary = self.entries.get(&id).ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        let (_, body) = self.read_document(summary)?;
        Ok(ArticleDetail { summary: summary.clone(), body })
    }

    /// Apply a shallow patch and rewrite the backing file.
    ///
    /// `updated_at` is re-stamped by the server; the patched record is
    /// returned so clients can replace their local copy wholesale.
    pub fn update(&mut self, id: Uuid, patch: &ArticlePatch) -> Result<ArticleDetail, ApiError> {
        let summary = self.entries.get(&id).ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        let (mut fields, old_body) = self.read_document(summary)?;

        let mut summary = summary.clone();
        if let Some(title) = &patch.title {
            summary.title = title.clone();
            fields.insert("title".to_string(), title.clone());
        }
        if let Some(tags) = &patch.tags {
            summary.tags = tags.clone();
        }

        let body = patch.body.clone().unwrap_or(old_body);
        summary.word_count = body.split_whitespace().count();
        summary.updated_at = Some(now_rfc3339());

        fields.insert("updated".to_string(), summary.updated_at.clone().unwrap_or_default());
        fields.insert("word_count".to_string(), summary.word_count.to_string());

        let file = self.root.join(&summary.path);
        let content = render_document(&fields, &summary.tags, &body);
        fs::write(&file, content)?;

        self.entries.insert(id, summary.clone());
        Ok(ArticleDetail { summary, body })
    }

    /// Delete an article and its backing file.
    pub fn delete(&mut self, id: Uuid) -> Result<(), ApiError> {
        let summary = self.entries.remove(&id).ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        let file = self.root.join(&summary.path);
        if file.exists() {
            fs::remove_file(&file)?;
        }
        Ok(())
    }

    fn read_document(&self, summary: &ArticleSummary) -> Result<(BTreeMap<String, String>, String), ApiError> {
        let content = fs::read_to_string(self.root.join(&summary.path))?;
        let (fields, body) = split_document(&content);
        Ok((fields, body.to_string()))
    }
}

/// Current UTC time formatted as RFC 3339.
fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

/// Recursively collect `.md` files under a directory.
fn collect_markdown_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_markdown_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "md") {
            files.push(path);
        }
    }
    Ok(())
}

/// Derive the stable article id from a library-relative path.
fn stable_id(relative_path: &str) -> Uuid {
    let digest = Sha256::digest(relative_path.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes)
}

/// Build a summary from a file's relative path and content.
fn summarize(relative_path: &str, content: &str) -> ArticleSummary {
    let (fields, body) = split_document(content);

    let title = fields
        .get("title")
        .cloned()
        .filter(|t| !t.is_empty())
        .or_else(|| first_heading(body))
        .unwrap_or_else(|| relative_path.to_string());

    let word_count = fields
        .get("word_count")
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| body.split_whitespace().count());

    ArticleSummary {
        id: stable_id(relative_path),
        title,
        path: relative_path.to_string(),
        domain: fields
            .get("domain")
            .cloned()
            .filter(|d| !d.is_empty())
            .or_else(|| {
                fields
                    .get("url")
                    .and_then(|u| Url::parse(u).ok())
                    .and_then(|u| u.host_str().map(str::to_string))
            }),
        tags: fields.get("tags").map(|raw| parse_tags(raw)).unwrap_or_default(),
        captured_at: fields.get("captured").cloned(),
        updated_at: fields.get("updated").cloned(),
        word_count,
    }
}

/// Split a markdown document into frontmatter fields and body.
///
/// Documents without a frontmatter block yield empty fields and the
/// whole content as body.
fn split_document(content: &str) -> (BTreeMap<String, String>, &str) {
    let mut fields = BTreeMap::new();

    let Some(rest) = content.strip_prefix("---\n") else {
        return (fields, content);
    };
    let Some(end) = rest.find("\n---\n") else {
        return (fields, content);
    };

    for line in rest[..end].lines() {
        if let Some((key, value)) = line.split_once(':') {
            fields.insert(key.trim().to_string(), unquote(value.trim()));
        }
    }

    let body = rest[end + "\n---\n".len()..].trim_start_matches('\n');
    (fields, body)
}

/// Strip surrounding quotes and unescape a frontmatter value.
fn unquote(value: &str) -> String {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    inner.replace("\\\"", "\"").replace("\\n", "\n").replace("\\\\", "\\")
}

/// Parse a `["a", "b"]` tag list.
fn parse_tags(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|t| unquote(t.trim()))
        .filter(|t| !t.is_empty())
        .collect()
}

/// First ATX heading of a markdown body, as a title fallback.
fn first_heading(body: &str) -> Option<String> {
    body.lines()
        .find(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim().to_string())
        .filter(|t| !t.is_empty())
}

fn quote(value: &str) -> String {
    format!(
        "\"{}\"",
        value.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
    )
}

/// Render a document back to frontmatter + body.
///
/// Known keys come first in a stable order; unknown frontmatter keys are
/// preserved after them.
fn render_document(fields: &BTreeMap<String, String>, tags: &[String], body: &str) -> String {
    const ORDERED_KEYS: &[&str] = &["title", "url", "domain", "captured", "updated", "word_count", "excerpt"];

    let mut out = String::from("---\n");
    for key in ORDERED_KEYS {
        if let Some(value) = fields.get(*key) {
            if *key == "word_count" {
                out.push_str(&format!("{}: {}\n", key, value));
            } else {
                out.push_str(&format!("{}: {}\n", key, quote(value)));
            }
        }
        if *key == "updated" && !tags.is_empty() {
            let rendered = tags.iter().map(|t| quote(t)).collect::<Vec<_>>().join(", ");
            out.push_str(&format!("tags: [{}]\n", rendered));
        }
    }
    for (key, value) in fields {
        if !ORDERED_KEYS.contains(&key.as_str()) && key != "tags" {
            out.push_str(&format!("{}: {}\n", key, quote(value)));
        }
    }
    out.push_str("---\n\n");
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out
}
