//! Main-content extraction from a parsed page.
//!
//! Given raw page HTML, locates the main content region, strips
//! boilerplate, and produces the cleaned fragment plus document metadata.
//! Extraction never fails: malformed markup degrades to a best-effort
//! result and an empty body yields an empty but successful extraction.

use scraper::{Html, Selector};
use url::Url;

use crate::clean::clean_html;
use crate::document::{CaptureOptions, DocumentMetadata, count_words};

/// The result of content extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Cleaned main-content HTML fragment.
    pub html: String,
    /// Metadata describing the capture, word count included.
    pub metadata: DocumentMetadata,
}

/// Extract the main content region of a page.
///
/// Policy: prefer a `<main>` or `<article>` landmark when present (the
/// largest by text length when several exist); otherwise fall back to
/// `<body>`. The selected fragment is cleaned per the capture options
/// before being returned.
pub fn extract(html: &str, url: Option<&str>, options: &CaptureOptions) -> Extraction {
    let doc = Html::parse_document(html);

    let fragment = select_content_region(&doc);
    let cleaned = clean_html(&fragment, options);

    let mut metadata = DocumentMetadata::new(extract_title(&doc), url);
    metadata.excerpt = extract_excerpt(&doc);
    metadata.word_count = count_words(&fragment_text(&cleaned));

    Extraction { html: cleaned, metadata }
}

/// Pick the landmark (or body) fragment to extract from.
fn select_content_region(doc: &Html) -> String {
    let landmark_sel = Selector::parse("main, article").unwrap();

    let best = doc
        .select(&landmark_sel)
        .max_by_key(|el| el.text().map(|t| t.trim().chars().count()).sum::<usize>());
    if let Some(el) = best {
        return el.inner_html();
    }

    let body_sel = Selector::parse("body").unwrap();
    match doc.select(&body_sel).next() {
        Some(body) => body.inner_html(),
        None => doc.root_element().inner_html(),
    }
}

/// Extract title with priority fallback:
/// 1. Open Graph `og:title`
/// 2. Twitter `twitter:title`
/// 3. `<title>` element
/// 4. First `<h1>` element
fn extract_title(doc: &Html) -> Option<String> {
    if let Some(title) = meta_content(doc, "og:title") {
        return Some(title);
    }
    if let Some(title) = meta_content(doc, "twitter:title") {
        return Some(title);
    }

    let title_sel = Selector::parse("head > title").unwrap();
    if let Some(el) = doc.select(&title_sel).next() {
        let text = el.text().collect::<String>();
        let text = text.trim();
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }

    let h1_sel = Selector::parse("h1").unwrap();
    if let Some(el) = doc.select(&h1_sel).next() {
        let text = el.text().collect::<String>();
        let text = text.trim();
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }

    None
}

/// Extract a short description from `og:description` or
/// `meta[name=description]`.
fn extract_excerpt(doc: &Html) -> Option<String> {
    meta_content(doc, "og:description").or_else(|| meta_content(doc, "description"))
}

/// Read a `<meta>` tag's content by `property` or `name`.
fn meta_content(doc: &Html, key: &str) -> Option<String> {
    for attr in ["property", "name"] {
        let selector = format!("meta[{}=\"{}\"]", attr, key);
        if let Ok(sel) = Selector::parse(&selector)
            && let Some(el) = doc.select(&sel).next()
            && let Some(content) = el.value().attr("content")
        {
            let content = content.trim();
            if !content.is_empty() {
                return Some(content.to_string());
            }
        }
    }
    None
}

/// Collect the text of an HTML fragment with tags stripped.
fn fragment_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment.root_element().text().collect::<Vec<_>>().join(" ")
}

/// Read the page title and canonical URL without extracting content.
///
/// Used by the `GET_PAGE_INFO` adapter message; read-only, no side
/// effects.
pub fn page_info(html: &str, url: Option<&str>) -> (Option<String>, Option<String>) {
    let doc = Html::parse_document(html);
    let title = extract_title(&doc);

    let canonical = url.and_then(|u| Url::parse(u).ok()).map(|u| u.to_string());
    (title, canonical)
}
