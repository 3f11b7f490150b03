//! Integration tests for the HTML preview resource pipeline
//!
//! These tests verify:
//! - Scanning only direct children and sorting them
//! - CSS before `</head>` and JS before `</body>` with provenance comments
//! - Best-effort loading when a file cannot be read
//! - Fallbacks for documents without closing tags

use camino::Utf8PathBuf;
use idtfe::services::resources::{enhance_html, inject, load, scan};
use std::fs;
use tempfile::TempDir;

const PAGE: &str = "<!DOCTYPE html>\n<html>\n<head>\n<title>Demo</title>\n</head>\n<body>\n<h1>Hi</h1>\n</body>\n</html>";

fn create_site_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    fs::write(dir.join("index.html"), PAGE).unwrap();
    fs::write(dir.join("z-theme.css"), "body { color: #333; }").unwrap();
    fs::write(dir.join("a-reset.css"), "* { margin: 0; }").unwrap();
    fs::write(dir.join("app.js"), "console.log('app');").unwrap();
    fs::create_dir(dir.join("vendor")).unwrap();
    fs::write(dir.join("vendor").join("lib.js"), "ignored();").unwrap();
    (temp_dir, dir)
}

#[test]
fn test_scan_is_not_recursive() {
    let (_temp_dir, dir) = create_site_dir();
    let set = scan(&dir).unwrap();

    assert_eq!(set.css_files, vec!["a-reset.css", "z-theme.css"]);
    assert_eq!(set.js_files, vec!["app.js"]);
}

#[test]
fn test_load_keeps_sorted_order_with_provenance() {
    let (_temp_dir, dir) = create_site_dir();
    let set = scan(&dir).unwrap();
    let resources = load(&dir, &set);

    assert_eq!(
        resources.css.content,
        "/* a-reset.css */\n* { margin: 0; }\n\n/* z-theme.css */\nbody { color: #333; }\n\n"
    );
    assert_eq!(resources.loaded, vec!["a-reset.css", "z-theme.css", "app.js"]);
    assert!(resources.partial_failure.is_empty());
}

#[test]
fn test_enhance_full_document() {
    let (_temp_dir, dir) = create_site_dir();
    let enhanced = enhance_html(PAGE, &dir, "index.html");

    let head_close = enhanced.html.find("</head>").unwrap();
    let body_close = enhanced.html.find("</body>").unwrap();
    let style = enhanced.html.find("<style>").unwrap();
    let script = enhanced.html.find("<script>").unwrap();

    assert!(style < head_close);
    assert!(head_close < script && script < body_close);
    assert!(enhanced.html.contains("/* app.js */\nconsole.log('app');"));
    assert!(!enhanced.html.contains("ignored();"));
    assert_eq!(enhanced.html.matches("</head>").count(), 1);
    assert_eq!(enhanced.html.matches("</body>").count(), 1);
}

#[test]
fn test_unreadable_file_reduces_detected_list() {
    let (_temp_dir, dir) = create_site_dir();
    fs::write(dir.join("broken.js"), [0xc3u8, 0x28]).unwrap();

    let enhanced = enhance_html(PAGE, &dir, "index.html");
    assert_eq!(
        enhanced.detected_resources,
        vec!["a-reset.css", "z-theme.css", "app.js"]
    );
    assert_eq!(enhanced.partial_failure.skipped.len(), 1);
    assert_eq!(enhanced.partial_failure.skipped[0].file, "broken.js");
}

#[test]
fn test_only_js_present() {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    fs::write(dir.join("main.js"), "run();").unwrap();

    let enhanced = enhance_html(PAGE, &dir, "index.html");
    assert!(!enhanced.html.contains("<style>"));
    assert!(enhanced.html.contains("<script>\n/* main.js */\nrun();\n\n</script>\n</body>"));
    assert_eq!(enhanced.detected_resources, vec!["main.js"]);
}

#[test]
fn test_empty_directory_is_identity() {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();

    let enhanced = enhance_html(PAGE, &dir, "index.html");
    assert_eq!(enhanced.html, PAGE);
    assert!(enhanced.detected_resources.is_empty());
}

#[test]
fn test_inject_fragment_without_tags() {
    let out = inject("<h1>x</h1>", "h1{}", "");
    assert_eq!(out, "<head><style>\nh1{}</style></head>\n<h1>x</h1>");

    let out = inject("<h1>x</h1>", "", "go();");
    assert_eq!(out, "<h1>x</h1>\n<script>\ngo();</script>");
}
