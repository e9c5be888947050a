//! HTML to Markdown conversion.
//!
//! Wraps the `htmd` converter with fixed style choices shared by every
//! capture surface: ATX headings, `-` bullets, fenced code blocks, and
//! inlined links. Conversion is idempotent; identical HTML input yields
//! byte-identical markdown.

use htmd::HtmlToMarkdown;
use htmd::options::{BulletListMarker, CodeBlockFence, CodeBlockStyle, HeadingStyle, LinkStyle, Options};

use crate::document::{DocumentMetadata, count_words};
use crate::{PrismError, Result};

/// Configuration for markdown output.
#[derive(Debug, Clone, Default)]
pub struct MarkdownConfig {
    /// Prepend a frontmatter block built from the document metadata.
    pub include_frontmatter: bool,
}

/// The result of a successful conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Converted markdown.
    pub markdown: String,
    /// Word count of the markdown body.
    pub word_count: usize,
}

/// Markdown converter with the fixed house style.
///
/// Every surface uses the same formatting options so that capturing the
/// same page from the CLI, the adapter, or the bookmarklet produces the
/// same file.
pub struct MarkdownConverter {
    converter: HtmlToMarkdown,
}

impl MarkdownConverter {
    /// Build a converter with the shared style choices.
    pub fn new() -> Self {
        let converter = HtmlToMarkdown::builder()
            .skip_tags(vec!["script", "style"])
            .options(Options {
                heading_style: HeadingStyle::Atx,
                bullet_list_marker: BulletListMarker::Dash,
                code_block_style: CodeBlockStyle::Fenced,
                code_block_fence: CodeBlockFence::Backticks,
                link_style: LinkStyle::Inlined,
                ..Default::default()
            })
            .build();

        Self { converter }
    }

    /// Convert an HTML fragment to markdown.
    ///
    /// Returns [`PrismError::ConversionError`] if the underlying converter
    /// fails; callers must not commit output from a failed conversion.
    pub fn convert(&self, html: &str) -> Result<Conversion> {
        let markdown = self
            .converter
            .convert(html)
            .map_err(|e| PrismError::ConversionError(e.to_string()))?;

        let markdown = markdown.trim().to_string();
        let word_count = count_words(&markdown);

        Ok(Conversion { markdown, word_count })
    }

    /// Convert an HTML fragment, prepending frontmatter when configured.
    pub fn convert_document(
        &self, html: &str, metadata: &DocumentMetadata, config: &MarkdownConfig,
    ) -> Result<String> {
        let conversion = self.convert(html)?;

        let mut output = String::new();
        if config.include_frontmatter {
            output.push_str(&generate_frontmatter(metadata));
            output.push('\n');
        }
        output.push_str(&conversion.markdown);
        output.push('\n');

        Ok(output)
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a YAML frontmatter block from capture metadata.
pub fn generate_frontmatter(metadata: &DocumentMetadata) -> String {
    let mut frontmatter = String::from("---");

    if let Some(title) = &metadata.title {
        frontmatter.push_str(&format!("\ntitle: {}", yaml_escape_string(title)));
    }

    if let Some(url) = &metadata.url {
        frontmatter.push_str(&format!("\nurl: {}", yaml_escape_string(url)));
    }

    if let Some(domain) = &metadata.domain {
        frontmatter.push_str(&format!("\ndomain: {}", yaml_escape_string(domain)));
    }

    frontmatter.push_str(&format!("\ncaptured: {}", yaml_escape_string(&metadata.extracted_at)));

    if !metadata.tags.is_empty() {
        let tags = metadata.tags.iter().map(|t| yaml_escape_string(t)).collect::<Vec<_>>().join(", ");
        frontmatter.push_str(&format!("\ntags: [{}]", tags));
    }

    frontmatter.push_str(&format!("\nword_count: {}", metadata.word_count));

    if let Some(excerpt) = &metadata.excerpt {
        frontmatter.push_str(&format!("\nexcerpt: {}", yaml_escape_string(excerpt)));
    }

    frontmatter.push_str("\n---\n");
    frontmatter
}

/// Quote a string for the frontmatter block.
fn yaml_escape_string(s: &str) -> String {
    format!(
        "\"{}\"",
        s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
    )
}
