//! HTML cleanup applied to extracted content.
//!
//! Scripts, styles, and comments are always removed. Boilerplate regions
//! (navigation, ads, social widgets) are stripped unless the capture
//! options disable cleaning. All passes are best-effort: a rewriter
//! failure falls back to the input instead of erroring.

use regex::Regex;

use crate::document::CaptureOptions;

/// Tags removed unconditionally before conversion.
const NOISE_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "svg", "canvas", "template"];

/// Tags removed when boilerplate cleaning is enabled.
const CHROME_TAGS: &[&str] = &["nav", "header", "footer", "aside", "form", "button"];

/// Class/ID fragments that mark boilerplate containers.
const DENY_PATTERN: &str = r"(?i)(^|[-_ ])(ad|ads|advert|advertisement|banner|sponsor|sponsored|promo|social|share|sharing|cookie|consent|popup|modal|newsletter|subscribe|sidebar|related|comments?|breadcrumbs?|pagination|menu)([-_ ]|$)";

/// Clean an HTML fragment according to the capture options.
///
/// Always removes scripts, styles, and comments; optionally strips
/// boilerplate tags and deny-listed containers, drops images, and unwraps
/// links down to their text.
pub fn clean_html(html: &str, options: &CaptureOptions) -> String {
    let mut processed = remove_comments(html);

    processed = remove_tags(&processed, NOISE_TAGS, false);

    if options.clean_html {
        processed = remove_tags(&processed, CHROME_TAGS, false);
        processed = remove_deny_listed_blocks(&processed);
    }

    if !options.include_images {
        processed = remove_tags(&processed, &["img", "picture", "figure"], false);
    }

    if !options.include_links {
        processed = remove_tags(&processed, &["a"], true);
    }

    normalize_whitespace(&processed)
}

/// Remove the given tags from HTML, optionally keeping their content.
///
/// Falls back to the input unchanged if the rewriter rejects the markup.
fn remove_tags(html: &str, tags: &[&str], keep_content: bool) -> String {
    let mut output = Vec::new();
    let handlers = tags
        .iter()
        .map(|tag| {
            if keep_content {
                lol_html::element!(*tag, |el| {
                    el.remove_and_keep_content();
                    Ok(())
                })
            } else {
                lol_html::element!(*tag, |el| {
                    el.remove();
                    Ok(())
                })
            }
        })
        .collect();

    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings { element_content_handlers: handlers, ..Default::default() },
        |c: &[u8]| output.extend_from_slice(c),
    );

    if rewriter.write(html.as_bytes()).is_err() {
        return html.to_string();
    }

    match rewriter.end() {
        Ok(_) => String::from_utf8(output).unwrap_or_else(|_| html.to_string()),
        Err(_) => html.to_string(),
    }
}

/// Remove HTML comments, including conditional comments.
fn remove_comments(html: &str) -> String {
    let re = Regex::new(r"(?s)<!--.*?-->").unwrap();
    re.replace_all(html, "").to_string()
}

/// Remove container blocks whose class or id matches the deny list.
///
/// Regex-based removal over the serialized markup; nested same-tag
/// containers may survive a single pass, so the sweep runs until stable.
fn remove_deny_listed_blocks(html: &str) -> String {
    let deny = Regex::new(DENY_PATTERN).unwrap();
    let attr_re = Regex::new(r#"(?is)<(div|section|ul|ol|aside|span|p)\s[^>]*?(?:class|id)\s*=\s*["']([^"']*)["'][^>]*>"#).unwrap();

    let mut result = html.to_string();
    for _ in 0..10 {
        let mut next = result.clone();

        let mut ranges: Vec<(usize, usize)> = Vec::new();
        for caps in attr_re.captures_iter(&result) {
            let whole = caps.get(0).unwrap();
            let tag = caps.get(1).unwrap().as_str();
            let value = caps.get(2).unwrap().as_str();

            if deny.is_match(value)
                && let Some(end) = find_closing_tag(&result, whole.end(), tag)
            {
                ranges.push((whole.start(), end));
            }
        }

        // remove from the back so earlier offsets stay valid
        ranges.sort_by(|a, b| b.0.cmp(&a.0));
        let mut removed_until = usize::MAX;
        for (start, end) in ranges {
            if end <= removed_until {
                next.replace_range(start..end, "");
                removed_until = start;
            }
        }

        if next == result {
            break;
        }
        result = next;
    }

    result
}

/// Find the byte offset just past the matching close tag, honoring nesting.
fn find_closing_tag(html: &str, from: usize, tag: &str) -> Option<usize> {
    let open_re = Regex::new(&format!(r"(?i)<{}[\s>]", regex::escape(tag))).unwrap();
    let close_re = Regex::new(&format!(r"(?i)</{}\s*>", regex::escape(tag))).unwrap();

    let mut depth = 1usize;
    let mut cursor = from;

    while depth > 0 {
        let close = close_re.find(&html[cursor..])?;
        let close_start = cursor + close.start();
        let close_end = cursor + close.end();

        let opens = open_re.find_iter(&html[cursor..close_start]).count();
        depth += opens;
        depth -= 1;

        cursor = close_end;
        if depth == 0 {
            return Some(close_end);
        }
    }

    None
}

/// Collapse runs of blank lines left behind by removals.
fn normalize_whitespace(html: &str) -> String {
    let re = Regex::new(r"\n{3,}").unwrap();
    re.replace_all(html, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_scripts_and_styles() {
        let html = r#"<p>Keep</p><script>alert(1)</script><style>p{}</style>"#;
        let cleaned = clean_html(html, &CaptureOptions::default());
        assert!(cleaned.contains("Keep"));
        assert!(!cleaned.contains("alert"));
        assert!(!cleaned.contains("p{}"));
    }

    #[test]
    fn test_removes_comments() {
        let html = "<p>Text</p><!-- hidden --><!--[if IE]>legacy<![endif]-->";
        let cleaned = clean_html(html, &CaptureOptions::default());
        assert!(!cleaned.contains("hidden"));
        assert!(!cleaned.contains("legacy"));
    }

    #[test]
    fn test_strips_navigation_when_cleaning() {
        let html = r#"<nav><a href="/">Home</a></nav><p>Article body text</p><footer>(c) 2026</footer>"#;
        let cleaned = clean_html(html, &CaptureOptions::default());
        assert!(!cleaned.contains("Home"));
        assert!(!cleaned.contains("(c) 2026"));
        assert!(cleaned.contains("Article body text"));
    }

    #[test]
    fn test_keeps_navigation_when_cleaning_disabled() {
        let html = r#"<nav><a href="/">Home</a></nav><p>Body</p>"#;
        let options = CaptureOptions { clean_html: false, ..Default::default() };
        let cleaned = clean_html(html, &options);
        assert!(cleaned.contains("Home"));
    }

    #[test]
    fn test_strips_deny_listed_container() {
        let html = r#"<div class="ad-banner"><p>Buy now</p></div><p>Real content</p>"#;
        let cleaned = clean_html(html, &CaptureOptions::default());
        assert!(!cleaned.contains("Buy now"));
        assert!(cleaned.contains("Real content"));
    }

    #[test]
    fn test_deny_list_matches_id() {
        let html = r#"<div id="sidebar"><p>Links</p></div><p>Body</p>"#;
        let cleaned = clean_html(html, &CaptureOptions::default());
        assert!(!cleaned.contains("Links"));
        assert!(cleaned.contains("Body"));
    }

    #[test]
    fn test_deny_list_leaves_partial_word_matches() {
        // "advice" contains "ad" but is not a boilerplate marker
        let html = r#"<div class="advice-column"><p>Helpful text</p></div>"#;
        let cleaned = clean_html(html, &CaptureOptions::default());
        assert!(cleaned.contains("Helpful text"));
    }

    #[test]
    fn test_nested_deny_listed_blocks() {
        let html = r#"<div class="social"><div class="share">Share</div>Follow</div><p>Kept</p>"#;
        let cleaned = clean_html(html, &CaptureOptions::default());
        assert!(!cleaned.contains("Share"));
        assert!(!cleaned.contains("Follow"));
        assert!(cleaned.contains("Kept"));
    }

    #[test]
    fn test_include_images_toggle() {
        let html = r#"<p>Text <img src="a.png" alt="pic"></p>"#;

        let with = clean_html(html, &CaptureOptions::default());
        assert!(with.contains("a.png"));

        let options = CaptureOptions { include_images: false, ..Default::default() };
        let without = clean_html(html, &options);
        assert!(!without.contains("a.png"));
    }

    #[test]
    fn test_include_links_unwraps_anchor_text() {
        let html = r#"<p>See <a href="https://example.com">the docs</a> here</p>"#;
        let options = CaptureOptions { include_links: false, ..Default::default() };
        let cleaned = clean_html(html, &options);
        assert!(!cleaned.contains("example.com"));
        assert!(cleaned.contains("the docs"));
    }

    #[test]
    fn test_malformed_markup_degrades_gracefully() {
        let html = "<div><p>Unclosed paragraph<div>Another";
        let cleaned = clean_html(html, &CaptureOptions::default());
        assert!(cleaned.contains("Unclosed paragraph"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_html("", &CaptureOptions::default()), "");
    }
}
