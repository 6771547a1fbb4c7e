//! End-to-end checks through the public API: config on disk, scan,
//! propagation, and rendering of a small document root.

use dirindex::asset::GeneratorAsset;
use dirindex::config::{self, IndexConfig, PageStyle};
use dirindex::exclude::ExclusionSet;
use dirindex::listing::{self, ListingError, ListingOptions};
use dirindex::propagate::{self, Propagation};
use dirindex::render;
use dirindex::scan;
use dirindex::size::format_size;
use filetime::FileTime;
use std::fs;
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};
use tempfile::TempDir;

const GENERATOR: &str = "index.gen";

fn asset(secs: u64) -> GeneratorAsset {
    GeneratorAsset::new(
        GENERATOR,
        b"#!/bin/sh\necho listing\n".to_vec(),
        UNIX_EPOCH + Duration::from_secs(secs),
    )
}

fn options() -> ListingOptions {
    ListingOptions {
        exclusions: ExclusionSet::new([GENERATOR, ".", ".."]).unwrap(),
    }
}

fn names(entries: &[dirindex::types::Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.name.as_str()).collect()
}

fn mtime(path: &Path) -> FileTime {
    FileTime::from_last_modification_time(&fs::metadata(path).unwrap())
}

#[test]
fn generator_and_dot_entries_are_excluded() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(GENERATOR), "old").unwrap();
    fs::write(tmp.path().join("a.txt"), vec![0u8; 500]).unwrap();
    fs::create_dir(tmp.path().join("sub")).unwrap();

    let (listing, _) = listing::build(tmp.path(), tmp.path(), &options(), None).unwrap();

    assert!(!listing.scan_failed);
    assert_eq!(names(&listing.files), vec!["a.txt"]);
    assert_eq!(names(&listing.directories), vec!["sub"]);
    assert_eq!(format_size(listing.files[0].size()), "500 B");
}

#[test]
fn files_and_directories_in_natural_order() {
    let tmp = TempDir::new().unwrap();
    for name in ["a10", "a2", "a1"] {
        fs::write(tmp.path().join(name), "x").unwrap();
        fs::create_dir(tmp.path().join(format!("d{name}"))).unwrap();
    }

    let scanned = scan::scan(tmp.path(), &options().exclusions).unwrap();

    assert_eq!(names(&scanned.files), vec!["a1", "a2", "a10"]);
    assert_eq!(names(&scanned.directories), vec!["da1", "da2", "da10"]);
}

#[test]
fn missing_directory_renders_as_failed_listing() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("gone");

    let (listing, report) =
        listing::build(tmp.path(), &missing, &options(), Some(&asset(1_000))).unwrap();

    assert!(listing.scan_failed);
    assert!(listing.files.is_empty());
    assert!(listing.directories.is_empty());
    assert_eq!(listing.current_path, "gone");
    assert!(report.is_empty());

    let html = render::render_page(&listing, &IndexConfig::default().display).into_string();
    assert!(html.contains("Index of /gone/"));
}

#[test]
fn directory_outside_root_is_rejected() {
    let root = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();

    let result = listing::build(root.path(), other.path(), &options(), None);

    assert!(matches!(result, Err(ListingError::OutsideRoot { .. })));
}

#[test]
fn propagation_writes_once_then_leaves_copy_alone() {
    let tmp = TempDir::new().unwrap();
    let sub = tmp.path().join("sub");
    fs::create_dir(&sub).unwrap();
    let asset = asset(1_000);

    let (_, first) = listing::build(tmp.path(), tmp.path(), &options(), Some(&asset)).unwrap();
    assert_eq!(first.written(), 1);
    let copy = sub.join(GENERATOR);
    assert_eq!(fs::read(&copy).unwrap(), asset.bytes);
    let written_at = mtime(&copy);

    let (_, second) = listing::build(tmp.path(), tmp.path(), &options(), Some(&asset)).unwrap();
    assert_eq!(second.written(), 0);
    assert_eq!(second.current(), 1);
    assert_eq!(mtime(&copy), written_at);
}

#[test]
fn newer_generator_replaces_stale_copy() {
    let tmp = TempDir::new().unwrap();
    let sub = tmp.path().join("sub");
    fs::create_dir(&sub).unwrap();
    let copy = sub.join(GENERATOR);
    fs::write(&copy, "outdated").unwrap();
    filetime::set_file_mtime(&copy, FileTime::from_unix_time(1_000, 0)).unwrap();

    let asset = asset(2_000);
    assert_eq!(propagate::propagate(&sub, &asset).unwrap(), Propagation::Written);
    assert_eq!(fs::read(&copy).unwrap(), asset.bytes);
}

#[test]
fn recursive_propagation_reaches_nested_directories() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("a/b/c")).unwrap();
    fs::create_dir_all(tmp.path().join("skip/inner")).unwrap();
    let exclusions = ExclusionSet::new([GENERATOR, "skip"]).unwrap();

    let report = propagate::propagate_tree(tmp.path(), &exclusions, &asset(1_000));

    assert_eq!(report.written(), 3);
    assert!(tmp.path().join("a/b/c").join(GENERATOR).exists());
    assert!(!tmp.path().join("skip").join(GENERATOR).exists());
    assert!(!tmp.path().join("skip/inner").join(GENERATOR).exists());
}

#[test]
fn size_boundaries() {
    assert_eq!(format_size(0), "0");
    assert_eq!(format_size(1023), "1023 B");
    assert_eq!(format_size(1024), "1 KB");
    assert_eq!(format_size(1024 * 1024), "1 MB");
}

#[test]
fn config_file_in_root_drives_exclusions_and_style() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(config::CONFIG_FILENAME),
        r#"
exclude = ["*.log"]
generator_name = "index.gen"

[display]
style = "table"
"#,
    )
    .unwrap();
    fs::write(tmp.path().join("debug.log"), "x").unwrap();
    fs::write(tmp.path().join("notes.txt"), vec![0u8; 2048]).unwrap();

    let config = config::load_config(tmp.path()).unwrap();
    assert_eq!(config.display.style, PageStyle::Table);
    let options = ListingOptions::from_config(&config).unwrap();

    let (listing, _) = listing::build(tmp.path(), tmp.path(), &options, None).unwrap();
    // The overlay replaces the exclude list, so the config file is listed too
    assert_eq!(names(&listing.files), vec!["dirindex.toml", "notes.txt"]);

    let html = render::render_page(&listing, &config.display).into_string();
    assert!(html.contains("<table"));
    assert!(html.contains(r#"<a href="notes.txt">notes.txt</a>"#));
    assert!(!html.contains("debug.log"));
}

#[test]
fn cgi_response_starts_with_headers() {
    let tmp = TempDir::new().unwrap();
    let config = IndexConfig::default();
    let (listing, _) =
        listing::build(tmp.path(), tmp.path(), &ListingOptions::from_config(&config).unwrap(), None)
            .unwrap();

    let response = format!(
        "{}{}",
        render::cgi_headers(&config.cgi),
        render::render_page(&listing, &config.display).into_string()
    );

    assert!(response.starts_with("Content-Type: text/html; charset=utf-8\r\n"));
    assert!(response.contains("\r\n\r\n<!DOCTYPE html>"));
}

#[test]
fn simple_style_with_directory_sizes_from_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(config::CONFIG_FILENAME),
        r#"
[display]
style = "simple"
show_directory_size = true
timezone = "UTC"
"#,
    )
    .unwrap();
    fs::write(tmp.path().join("notes.txt"), vec![0u8; 2048]).unwrap();
    fs::create_dir(tmp.path().join("sub")).unwrap();

    let config = config::load_config(tmp.path()).unwrap();
    assert_eq!(config.display.style, PageStyle::Simple);
    let options = ListingOptions::from_config(&config).unwrap();
    let (listing, _) = listing::build(tmp.path(), tmp.path(), &options, None).unwrap();

    let dir_size = format_size(listing.directories[0].size());
    let html = render::render_page(&listing, &config.display).into_string();
    assert_eq!(html.matches("<table").count(), 1);
    assert!(html.contains("<td>2 KB</td>"));
    assert!(html.contains(&format!("<td>{dir_size}</td>")));
    assert!(!html.contains("<td>DIR</td>"));
}
