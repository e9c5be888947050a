//! The capture pipeline.
//!
//! Composes the stages every surface shares: extract the main content,
//! convert it to markdown, attach frontmatter, and suggest a repository
//! path. Committing the result is a separate step so surfaces without
//! network access (or captures run with commits disabled) stop at the
//! document.

use crate::document::{CaptureOptions, CapturedDocument, suggested_path};
use crate::extract::extract;
use crate::markdown::{MarkdownConfig, MarkdownConverter};
use crate::Result;

#[cfg(feature = "http")]
use crate::github::{CommitOutcome, GitHubClient};

/// Per-capture configuration shared by the CLI and the adapters.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub options: CaptureOptions,
    /// Prepend metadata frontmatter to the markdown.
    pub include_frontmatter: bool,
    /// Repository folder committed captures land in.
    pub folder: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { options: CaptureOptions::default(), include_frontmatter: true, folder: "captures".to_string() }
    }
}

/// Run extraction and conversion over raw page HTML.
///
/// Extraction never fails; conversion errors propagate so callers do not
/// commit partial output.
pub fn capture(html: &str, url: Option<&str>, config: &CaptureConfig) -> Result<CapturedDocument> {
    let extraction = extract(html, url, &config.options);

    let converter = MarkdownConverter::new();
    let markdown_config = MarkdownConfig { include_frontmatter: config.include_frontmatter };
    let markdown = converter.convert_document(&extraction.html, &extraction.metadata, &markdown_config)?;

    let path = suggested_path(&extraction.metadata, &config.folder);

    Ok(CapturedDocument { markdown, metadata: extraction.metadata, suggested_path: path })
}

/// Expand a commit-message template for a document.
///
/// `{title}` and `{url}` placeholders are replaced from the metadata.
pub fn commit_message(template: &str, doc: &CapturedDocument) -> String {
    template
        .replace("{title}", doc.metadata.title.as_deref().unwrap_or("untitled"))
        .replace("{url}", doc.metadata.url.as_deref().unwrap_or(""))
}

/// Commit a captured document to the configured repository.
#[cfg(feature = "http")]
pub async fn commit_document(
    client: &GitHubClient, doc: &CapturedDocument, message_template: &str,
) -> Result<CommitOutcome> {
    let message = commit_message(message_template, doc);
    client.commit_file(&doc.suggested_path, &doc.markdown, &message).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_title_and_paragraph() {
        let html = "<html><body><main><h1>Test Title</h1><p>Test paragraph.</p></main></body></html>";
        let config = CaptureConfig { include_frontmatter: false, ..Default::default() };

        let doc = capture(html, None, &config).unwrap();
        assert!(doc.markdown.contains("# Test Title"));
        assert!(doc.markdown.contains("Test paragraph."));
    }

    #[test]
    fn test_capture_empty_body_succeeds() {
        let doc = capture(
            "<html><body></body></html>",
            None,
            &CaptureConfig { include_frontmatter: false, ..Default::default() },
        )
        .unwrap();
        assert_eq!(doc.markdown.trim(), "");
        assert_eq!(doc.metadata.word_count, 0);
    }

    #[test]
    fn test_capture_includes_frontmatter() {
        let html = r#"<html><head><title>Post</title></head><body><p>Body text.</p></body></html>"#;
        let doc = capture(html, Some("https://example.com/post"), &CaptureConfig::default()).unwrap();

        assert!(doc.markdown.starts_with("---\n"));
        assert!(doc.markdown.contains("title: \"Post\""));
        assert!(doc.markdown.contains("url: \"https://example.com/post\""));
    }

    #[test]
    fn test_suggested_path_uses_folder_and_slug() {
        let html = r#"<html><head><title>A Nice Post</title></head><body><p>x</p></body></html>"#;
        let config = CaptureConfig { folder: "notes".to_string(), ..Default::default() };

        let doc = capture(html, None, &config).unwrap();
        assert!(doc.suggested_path.starts_with("notes/"));
        assert!(doc.suggested_path.ends_with("-a-nice-post.md"));
    }

    #[test]
    fn test_commit_message_template() {
        let html = r#"<html><head><title>Post</title></head><body><p>x</p></body></html>"#;
        let doc = capture(html, Some("https://example.com/p"), &CaptureConfig::default()).unwrap();

        let message = commit_message("Capture: {title} ({url})", &doc);
        assert_eq!(message, "Capture: Post (https://example.com/p)");
    }
}
