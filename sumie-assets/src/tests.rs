use super::*;
use std::fs;
use std::path::PathBuf;

fn unique_temp_dir(label: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let id = format!(
        "sumie-assets-{label}-{}-{}",
        std::process::id(),
        unix_timestamp()
    );
    let dir = base.join(id);
    fs::create_dir_all(&dir).expect("create temp directory");
    dir
}

#[test]
fn asset_names_share_one_timestamp() {
    let names = AssetNameContext::with_timestamp("demo", 1699999999);
    assert_eq!(names.file_name(1), "demo_1699999999_1.png");
    assert_eq!(names.file_name(2), "demo_1699999999_2.png");
    assert_eq!(names.timestamp(), 1699999999);
}

#[test]
fn prefix_is_sanitized_for_filenames() {
    let names = AssetNameContext::with_timestamp("My Cool Banner!", 7);
    assert_eq!(names.prefix(), "My-Cool-Banner");
    assert_eq!(names.file_name(1), "My-Cool-Banner_7_1.png");

    let underscores = AssetNameContext::with_timestamp("hero_banner", 7);
    assert_eq!(underscores.prefix(), "hero_banner");

    let traversal = AssetNameContext::with_timestamp("../escape", 7);
    assert_eq!(traversal.prefix(), "escape");
}

#[test]
fn blank_prefix_falls_back_to_default() {
    assert_eq!(
        AssetNameContext::with_timestamp("   ", 7).prefix(),
        DEFAULT_PREFIX
    );
    assert_eq!(
        AssetNameContext::with_timestamp("///", 7).prefix(),
        DEFAULT_PREFIX
    );
}

#[test]
fn empty_url_list_is_rejected() {
    let dir = unique_temp_dir("empty");
    let names = AssetNameContext::with_timestamp("demo", 1);

    let error = download_all(&[], &dir, &names).expect_err("no URLs");
    assert!(matches!(error, DownloadError::NoImages));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn invalid_urls_are_reported_with_indices() {
    let dir = unique_temp_dir("invalid");
    let nested = dir.join("assets");
    let names = AssetNameContext::with_timestamp("demo", 1);
    let urls = vec!["not a url".to_string(), "also bad".to_string()];

    let error = download_all(&urls, &nested, &names).expect_err("both URLs invalid");
    let (saved, failed) = match error {
        DownloadError::Incomplete { saved, failed } => (saved, failed),
        other => panic!("expected incomplete download, got {other:?}"),
    };
    assert!(saved.is_empty());
    assert_eq!(failed.len(), 2);
    assert_eq!(failed[0].index, 1);
    assert_eq!(failed[1].index, 2);
    assert!(nested.is_dir(), "output directory is created before fetching");

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn incomplete_error_reports_counts_and_indices() {
    let error = DownloadError::Incomplete {
        saved: vec![PathBuf::from("demo_1_1.png")],
        failed: vec![FailedDownload {
            index: 2,
            url: "https://cdn.example/b.png".to_string(),
            reason: "boom".to_string(),
        }],
    };

    let message = error.to_string();
    assert!(message.contains("saved 1 of 2 assets"));
    assert!(message.contains("failed indices: 2"));
}

#[test]
fn unwritable_output_directory_is_an_io_error() {
    let dir = unique_temp_dir("io");
    let occupied = dir.join("occupied");
    fs::write(&occupied, b"x").expect("write blocking file");
    let names = AssetNameContext::with_timestamp("demo", 1);
    let urls = vec!["https://cdn.example/a.png".to_string()];

    let error = download_all(&urls, &occupied, &names).expect_err("directory path is a file");
    assert!(matches!(error, DownloadError::Io { .. }));

    fs::remove_dir_all(&dir).ok();
}
