// End-to-end conversion scenarios against a real temp directory
use std::fs;
use std::path::Path;

use datauri_extract::{ConvertConfig, DocumentRewriter, convert};
use proptest::prelude::*;

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read output dir failed")
        .flatten()
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn single_data_image_is_written_and_referenced() {
    let dir = tempfile::tempdir().expect("create temp dir failed");
    let disk_path = dir.path().to_string_lossy().to_string();

    let output = convert(r#"<img src="data:image/png;base64,AAAA">"#, &disk_path, "/files");

    let files = files_in(dir.path());
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with(".png"));
    assert_eq!(fs::read(dir.path().join(&files[0])).expect("read back failed"), vec![0, 0, 0]);
    assert_eq!(output, format!(r#"<img src="/files/{}">"#, files[0]));
}

#[test]
fn two_data_images_and_one_remote_image() {
    let dir = tempfile::tempdir().expect("create temp dir failed");
    let disk_path = format!("{}/", dir.path().to_string_lossy());
    let html = concat!(
        r#"<html><body><h1>Title</h1>"#,
        r#"<img src="data:image/png;base64,AAAA">"#,
        r#"<img src="http://example.com/a.jpg">"#,
        r#"<img class="hero" src="data:image/jpeg;base64,AQID">"#,
        r#"</body></html>"#,
    );

    let output = convert(html, &disk_path, "/files/");

    assert_eq!(files_in(dir.path()).len(), 2);
    assert_eq!(output.matches(r#"src="/files/"#).count(), 2);
    assert!(output.contains(r#"<img src="http://example.com/a.jpg">"#));
    assert!(output.contains(r#"<h1>Title</h1>"#));
    assert!(!output.contains("data:image"));
}

#[test]
fn unwritable_disk_path_leaves_html_unmodified() {
    let dir = tempfile::tempdir().expect("create temp dir failed");
    let missing = dir.path().join("does-not-exist").to_string_lossy().to_string();
    let html = r#"<p>before</p><img src="data:image/png;base64,AAAA"><p>after</p>"#;

    let output = convert(html, &missing, "/files");

    assert_eq!(output, html);
    assert!(!Path::new(&missing).exists());
}

#[test]
fn malformed_data_uri_does_not_abort_conversion() {
    let dir = tempfile::tempdir().expect("create temp dir failed");
    let config = ConvertConfig {
        disk_path: dir.path().to_string_lossy().to_string(),
        url_path: "/files".to_string(),
        ..ConvertConfig::default()
    };
    let rewriter = DocumentRewriter::new(config).expect("rewriter init failed");
    let html = r#"<img src="data:image/pngbase64AAAA"><img src="data:image/gif;base64,R0lG">"#;

    let (output, report) = rewriter.convert_with_report(html).expect("convert failed");

    assert!(output.starts_with(r#"<img src="data:image/pngbase64AAAA">"#));
    assert!(!output.contains("data:image/gif"));
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.substitutions.len(), 1);
    assert_eq!(files_in(dir.path()).len(), 1);
}

#[test]
fn missing_disk_dir_is_created_when_configured() {
    let dir = tempfile::tempdir().expect("create temp dir failed");
    let nested = dir.path().join("uploads").join("2024");
    let config = ConvertConfig {
        disk_path: nested.to_string_lossy().to_string(),
        url_path: "https://cdn.example.com/uploads/2024".to_string(),
        create_missing_dir: true,
        name_prefix: "inline".to_string(),
        ..ConvertConfig::default()
    };
    let rewriter = DocumentRewriter::new(config).expect("rewriter init failed");

    let output = rewriter.convert(r#"<img src="data:image/webp;base64,AAAA">"#);

    let files = files_in(&nested);
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("inline_"));
    assert!(output.contains(&format!("https://cdn.example.com/uploads/2024/{}", files[0])));
}

#[test]
fn empty_disk_path_returns_input() {
    let html = r#"<img src="data:image/png;base64,AAAA">"#;
    assert_eq!(convert(html, "", "/files"), html);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn html_without_data_images_is_unchanged(
        text in "[a-zA-Z0-9 .,!?]{0,40}",
        href in "[a-z]{1,10}\\.(png|jpg|gif)",
    ) {
        let dir = tempfile::tempdir().expect("create temp dir failed");
        let disk_path = dir.path().to_string_lossy().to_string();
        let html = format!(
            r#"<div class="post"><p>{text}</p><img src="/static/{href}" alt="{text}"><br/></div>"#
        );

        let output = convert(&html, &disk_path, "/files");

        prop_assert_eq!(output, html);
        prop_assert!(files_in(dir.path()).is_empty());
    }
}
