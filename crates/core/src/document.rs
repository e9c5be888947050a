//! Capture options and document metadata.
//!
//! This module defines the [`CaptureOptions`] toggles passed into
//! extraction, the [`DocumentMetadata`] record produced once per capture,
//! and the [`CapturedDocument`] output of the full pipeline.

use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;

/// Toggles passed into content extraction.
///
/// All fields default to `true`; there are no invariants beyond the
/// boolean defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureOptions {
    /// Keep `<img>` elements in the extracted content.
    pub include_images: bool,
    /// Keep `<a>` elements; when false, anchors are unwrapped to their text.
    pub include_links: bool,
    /// Strip boilerplate regions (navigation, ads, footers) from the content.
    pub clean_html: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self { include_images: true, include_links: true, clean_html: true }
    }
}

/// Metadata attached to a captured document.
///
/// Produced once per capture and immutable after creation. Serialized as
/// frontmatter on the committed markdown file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    /// Document title, best-effort from meta tags or headings.
    pub title: Option<String>,
    /// Source page URL, if known.
    pub url: Option<String>,
    /// Host portion of the source URL.
    pub domain: Option<String>,
    /// RFC 3339 timestamp taken when the capture ran.
    pub extracted_at: String,
    /// User-assigned tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Word count of the extracted text.
    pub word_count: usize,
    /// Short description, from `og:description` or `meta[name=description]`.
    pub excerpt: Option<String>,
}

impl DocumentMetadata {
    /// Creates metadata stamped with the current time.
    ///
    /// `domain` is derived from `url` when it parses.
    pub fn new(title: Option<String>, url: Option<&str>) -> Self {
        let domain = url.and_then(|u| Url::parse(u).ok()).and_then(|u| u.host_str().map(str::to_string));

        Self {
            title,
            url: url.map(str::to_string),
            domain,
            extracted_at: now_rfc3339(),
            tags: Vec::new(),
            word_count: 0,
            excerpt: None,
        }
    }

    /// The calendar date portion (`yyyy-mm-dd`) of the capture timestamp.
    pub fn capture_date(&self) -> &str {
        if self.extracted_at.len() >= 10 { &self.extracted_at[..10] } else { &self.extracted_at }
    }
}

/// The complete result of a capture pipeline run.
///
/// Combines the converted markdown with its metadata and the repository
/// path the file would be committed under.
#[derive(Debug, Clone, Serialize)]
pub struct CapturedDocument {
    /// Converted markdown, frontmatter included when requested.
    pub markdown: String,
    /// Metadata describing the capture.
    pub metadata: DocumentMetadata,
    /// Repository-relative path suggestion: `{folder}/{date}-{slug}.md`.
    pub suggested_path: String,
}

/// Current UTC time formatted as RFC 3339.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

/// Reduce a title to a filename-safe slug.
///
/// Lowercases, replaces runs of non-alphanumeric characters with a single
/// hyphen, and truncates to 60 characters. An empty or symbol-only title
/// slugs to "untitled".
pub fn slugify(title: &str) -> String {
    let re = Regex::new(r"[^a-z0-9]+").unwrap();
    let lowered = title.to_lowercase();
    let slug = re.replace_all(&lowered, "-").trim_matches('-').to_string();

    let slug: String = slug.chars().take(60).collect();
    let slug = slug.trim_matches('-').to_string();

    if slug.is_empty() { "untitled".to_string() } else { slug }
}

/// Build the repository path a capture should be committed under.
pub fn suggested_path(metadata: &DocumentMetadata, folder: &str) -> String {
    let title = metadata.title.as_deref().unwrap_or("untitled");
    let name = format!("{}-{}.md", metadata.capture_date(), slugify(title));

    let folder = folder.trim_matches('/');
    if folder.is_empty() { name } else { format!("{}/{}", folder, name) }
}

/// Count words in text using a simple regex pattern
pub(crate) fn count_words(text: &str) -> usize {
    let word_regex = Regex::new(r"\b[\w'-]+\b").unwrap();
    word_regex.find_iter(text).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_capture_options_default() {
        let options = CaptureOptions::default();
        assert!(options.include_images);
        assert!(options.include_links);
        assert!(options.clean_html);
    }

    #[test]
    fn test_metadata_derives_domain() {
        let meta = DocumentMetadata::new(Some("Test".to_string()), Some("https://blog.example.com/post/1"));
        assert_eq!(meta.domain.as_deref(), Some("blog.example.com"));
        assert_eq!(meta.url.as_deref(), Some("https://blog.example.com/post/1"));
    }

    #[test]
    fn test_metadata_timestamp_is_rfc3339() {
        let meta = DocumentMetadata::new(None, None);
        assert!(meta.extracted_at.contains('T'));
        assert_eq!(meta.capture_date().len(), 10);
    }

    #[rstest]
    #[case("Hello, World!", "hello-world")]
    #[case("Rust: 2024 Edition — Notes", "rust-2024-edition-notes")]
    #[case("  Spaces   everywhere  ", "spaces-everywhere")]
    #[case("***", "untitled")]
    #[case("", "untitled")]
    fn test_slugify(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(slugify(title), expected);
    }

    #[test]
    fn test_slugify_truncates() {
        let long = "word ".repeat(40);
        let slug = slugify(&long);
        assert!(slug.len() <= 60);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_suggested_path() {
        let mut meta = DocumentMetadata::new(Some("Test Title".to_string()), None);
        meta.extracted_at = "2026-08-07T12:00:00Z".to_string();

        assert_eq!(suggested_path(&meta, "captures"), "captures/2026-08-07-test-title.md");
        assert_eq!(suggested_path(&meta, ""), "2026-08-07-test-title.md");
        assert_eq!(suggested_path(&meta, "/nested/dir/"), "nested/dir/2026-08-07-test-title.md");
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("hello world"), 2);
        assert_eq!(count_words("one"), 1);
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("a b c d e"), 5);
    }
}
