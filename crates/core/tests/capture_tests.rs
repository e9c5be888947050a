//! Library API integration tests
use prismweave_core::*;
use serde_json::json;

const ARTICLE_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <title>Understanding Borrow Checking</title>
    <meta name="description" content="A practical tour of the borrow checker.">
</head>
<body>
    <nav><a href="/">Home</a><a href="/posts">Posts</a></nav>
    <main>
        <h1>Understanding Borrow Checking</h1>
        <p>The borrow checker enforces aliasing rules at compile time, and most
        programs can be restructured to satisfy it without runtime cost.</p>
        <p>Shared references are read-only, while mutable references are
        exclusive for their whole lifetime.</p>
    </main>
    <div class="ad-banner">Subscribe to our newsletter!</div>
    <footer>All rights reserved.</footer>
</body>
</html>
"#;

#[test]
fn test_capture_pipeline_end_to_end() {
    let config = CaptureConfig::default();
    let doc = capture(ARTICLE_HTML, Some("https://example.com/posts/borrow"), &config).unwrap();

    assert!(doc.markdown.starts_with("---\n"));
    assert!(doc.markdown.contains("# Understanding Borrow Checking"));
    assert!(doc.markdown.contains("aliasing rules"));

    assert!(!doc.markdown.contains("Subscribe to our newsletter"));
    assert!(!doc.markdown.contains("All rights reserved"));

    assert_eq!(doc.metadata.domain.as_deref(), Some("example.com"));
    assert!(doc.metadata.word_count > 20);
    assert!(doc.suggested_path.ends_with("-understanding-borrow-checking.md"));
}

#[test]
fn test_capture_is_deterministic() {
    let config = CaptureConfig { include_frontmatter: false, ..Default::default() };

    let first = capture(ARTICLE_HTML, None, &config).unwrap();
    let second = capture(ARTICLE_HTML, None, &config).unwrap();
    assert_eq!(first.markdown, second.markdown);
}

#[test]
fn test_empty_page_captures_successfully() {
    let config = CaptureConfig { include_frontmatter: false, ..Default::default() };
    let doc = capture("<html><body></body></html>", None, &config).unwrap();

    assert_eq!(doc.markdown.trim(), "");
    assert_eq!(doc.metadata.word_count, 0);
}

#[test]
fn test_adapter_message_protocol() {
    let mut adapter = CaptureAdapter::new();
    assert_eq!(adapter.state(), AdapterState::Uninitialized);

    adapter.load_page(PageContext { html: ARTICLE_HTML.to_string(), url: Some("https://example.com/posts/borrow".to_string()) });

    let info = adapter.handle(&json!({"type": "GET_PAGE_INFO"})).unwrap();
    assert_eq!(info["title"], "Understanding Borrow Checking");

    let extracted = adapter.handle(&json!({"type": "EXTRACT_CONTENT"})).unwrap();
    assert!(extracted["markdown"].as_str().unwrap().contains("# Understanding Borrow Checking"));

    let err = adapter.handle(&json!({"type": "NOT_A_MESSAGE"})).unwrap_err();
    assert!(err.to_string().contains("Unknown message type"));
}

#[test]
fn test_bookmarklet_round_trip_via_public_api() {
    let config = PatConfig {
        github_token: "ghp_integration_test_token".to_string(),
        github_repo: "testuser/testrepo".to_string(),
        default_folder: Some("clips".to_string()),
        commit_message: Some("Clipped".to_string()),
    };

    let script = generate_personal_bookmarklet(&config).unwrap();
    assert!(script.starts_with("javascript:"));
    assert!(script.contains("atob("));
    assert!(script.contains("api.github.com"));
    assert!(!script.contains("ghp_integration_test_token"));

    assert_eq!(extract_config_from_bookmarklet(&script), Some(config));
}

#[test]
fn test_settings_defaults_and_validation() {
    let defaults = default_settings();
    for spec in schema() {
        assert!(defaults.contains_key(spec.key));
    }
    assert!(validate_settings(&defaults).valid);
}

#[test]
fn test_settings_manager_over_memory_storage() {
    let mut manager = SettingsManager::new(MemoryStorage::new());

    let mut settings = manager.load();
    settings.insert("github_repo".to_string(), SettingValue::Str("testuser/notes".to_string()));
    manager.save(&settings).unwrap();

    assert_eq!(
        manager.load().get("github_repo").and_then(|v| v.as_str().map(str::to_string)),
        Some("testuser/notes".to_string())
    );
}
