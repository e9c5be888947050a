//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("prismweave").unwrap()
}

const ARTICLE_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head><title>Sample Article</title></head>
<body>
    <nav><a href="/">Home</a></nav>
    <main>
        <h1>Sample Article</h1>
        <p>A paragraph of body text for the capture tests.</p>
    </main>
    <footer>Footer text</footer>
</body>
</html>
"#;

fn write_fixture(dir: &TempDir) -> String {
    let path = dir.path().join("article.html");
    std::fs::write(&path, ARTICLE_HTML).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_capture_file_input() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .args(["capture", &write_fixture(&tmp)])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Sample Article"))
        .stdout(predicate::str::contains("body text"));
}

#[test]
fn test_capture_stdin_input() {
    cmd()
        .args(["capture", "-"])
        .write_stdin(ARTICLE_HTML)
        .assert()
        .success()
        .stdout(predicate::str::contains("# Sample Article"));
}

#[test]
fn test_capture_strips_boilerplate() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .args(["capture", &write_fixture(&tmp)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Footer text").not())
        .stdout(predicate::str::contains("Home").not());
}

#[test]
fn test_capture_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("output.md");

    cmd()
        .args(["capture", "-o", output.to_str().unwrap(), &write_fixture(&tmp)])
        .assert()
        .success();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("# Sample Article"));
}

#[test]
fn test_capture_default_includes_frontmatter() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .args(["capture", &write_fixture(&tmp)])
        .env("XDG_CONFIG_HOME", tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("---"))
        .stdout(predicate::str::contains("title: \"Sample Article\""));
}

#[test]
fn test_capture_no_frontmatter_flag() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .args(["capture", "--no-frontmatter", &write_fixture(&tmp)])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Sample Article"));
}

#[test]
fn test_capture_source_url_recorded() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .args([
            "capture",
            "--source-url",
            "https://example.com/sample",
            &write_fixture(&tmp),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("url: \"https://example.com/sample\""))
        .stdout(predicate::str::contains("domain: \"example.com\""));
}

#[test]
fn test_capture_invalid_file() {
    cmd().args(["capture", "nonexistent.html"]).assert().failure();
}

#[test]
fn test_capture_commit_without_token_fails() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .args(["capture", "--commit", "--repo", "user/repo", &write_fixture(&tmp)])
        .env_remove("GITHUB_TOKEN")
        .env("XDG_CONFIG_HOME", tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("token"));
}

#[test]
fn test_bookmarklet_generate_shape() {
    cmd()
        .args([
            "bookmarklet",
            "generate",
            "--token",
            "ghp_cli_test_token",
            "--repo",
            "testuser/testrepo",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("javascript:"))
        .stdout(predicate::str::contains("atob("))
        .stdout(predicate::str::contains("api.github.com"))
        .stdout(predicate::str::contains("ghp_cli_test_token").not());
}

#[test]
fn test_bookmarklet_generate_rejects_bad_repo() {
    cmd()
        .args([
            "bookmarklet",
            "generate",
            "--token",
            "ghp_x",
            "--repo",
            "not-a-slug",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("owner/repo"));
}

#[test]
fn test_bookmarklet_round_trip_through_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bookmarklet.txt");

    cmd()
        .args([
            "bookmarklet",
            "generate",
            "--token",
            "ghp_roundtrip",
            "--repo",
            "testuser/testrepo",
            "--folder",
            "clips",
            "-o",
            path.to_str().unwrap(),
        ])
        .assert()
        .success();

    let decoded = cmd()
        .args(["bookmarklet", "decode", path.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let config: serde_json::Value = serde_json::from_slice(&decoded).unwrap();
    assert_eq!(config["githubToken"], "ghp_roundtrip");
    assert_eq!(config["githubRepo"], "testuser/testrepo");
    assert_eq!(config["defaultFolder"], "clips");
}

#[test]
fn test_bookmarklet_decode_rejects_garbage() {
    cmd()
        .args(["bookmarklet", "decode", "javascript:alert(1)"])
        .assert()
        .failure();
}

#[test]
fn test_settings_show_prints_defaults() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .args(["settings", "show"])
        .env("XDG_CONFIG_HOME", tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("include_images"))
        .stdout(predicate::str::contains("github_repo"));
}

#[test]
fn test_settings_set_and_show() {
    let tmp = TempDir::new().unwrap();

    cmd()
        .args(["settings", "set", "github_repo", "testuser/notes"])
        .env("XDG_CONFIG_HOME", tmp.path())
        .assert()
        .success();

    cmd()
        .args(["settings", "show"])
        .env("XDG_CONFIG_HOME", tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("testuser/notes"));
}

#[test]
fn test_settings_set_rejects_invalid_value() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .args(["settings", "set", "toast_position", "center"])
        .env("XDG_CONFIG_HOME", tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("toast_position"));
}

#[test]
fn test_unknown_subcommand_fails() {
    cmd().arg("frobnicate").assert().failure();
}
