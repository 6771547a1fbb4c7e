//! Serving one listing as a CGI response.
//!
//! A web server runs the generator with the listed directory as the working
//! directory and request details in the environment. [`respond`] always
//! writes a complete response: headers, a blank line, then the page. Each
//! failure shrinks the page instead of aborting it:
//!
//! | Failure | Response |
//! |---------|----------|
//! | Config missing or invalid | Stock defaults |
//! | Generator payload unreadable | Listing without propagation |
//! | Directory outside `DOCUMENT_ROOT` | Current path taken from `SCRIPT_NAME` |
//! | Directory unreadable | Notice instead of rows |
//!
//! Servers pass the words of an ISINDEX query (a query string without `=`)
//! as command-line arguments. [`is_gateway_request`] lets the binary skip
//! argument parsing entirely for such invocations.

use crate::asset::GeneratorAsset;
use crate::config::{self, IndexConfig};
use crate::listing::{self, ListingOptions};
use crate::render;
use std::io::{self, Write};
use std::path::PathBuf;

/// What one CGI invocation needs to know about its request.
#[derive(Debug, Clone, Default)]
pub struct CgiRequest {
    /// Directory to list.
    pub dir: PathBuf,
    /// `DOCUMENT_ROOT`; the listed directory itself when unset.
    pub document_root: Option<PathBuf>,
    /// `SCRIPT_NAME`, the URL path the generator was requested under.
    pub script_name: Option<String>,
    /// Config file to use instead of `<root>/dirindex.toml`.
    pub config_path: Option<PathBuf>,
    /// Payload to propagate instead of the running executable.
    pub asset_path: Option<PathBuf>,
}

impl CgiRequest {
    /// Request for the working directory, described by the CGI environment.
    pub fn from_env() -> Self {
        Self {
            dir: PathBuf::from("."),
            document_root: std::env::var_os("DOCUMENT_ROOT").map(PathBuf::from),
            script_name: std::env::var("SCRIPT_NAME").ok(),
            config_path: None,
            asset_path: None,
        }
    }
}

/// True when a web server started this process (`GATEWAY_INTERFACE` is set).
pub fn is_gateway_request() -> bool {
    std::env::var_os("GATEWAY_INTERFACE").is_some()
}

/// Directory part of a script URL path, without slashes at either end:
/// `/~ann/photos/index.cgi` → `~ann/photos`.
pub fn script_dir(script_name: &str) -> String {
    let mut segments: Vec<&str> = script_name.split('/').filter(|s| !s.is_empty()).collect();
    segments.pop();
    segments.join("/")
}

/// List `request.dir` and write the full CGI response to `out`.
///
/// Only errors writing to `out` are returned.
pub fn respond<W: Write>(request: &CgiRequest, out: &mut W) -> io::Result<()> {
    let root = request
        .document_root
        .clone()
        .unwrap_or_else(|| request.dir.clone());

    let loaded = match &request.config_path {
        Some(path) => config::load_config_file(path),
        None => config::load_config(&root),
    };
    let config = loaded.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "using default config");
        IndexConfig::default()
    });
    let options = ListingOptions::from_config(&config).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "listing without exclusions");
        ListingOptions::default()
    });
    let asset = GeneratorAsset::load(request.asset_path.as_deref(), &config.generator_name)
        .map_err(|err| tracing::warn!(error = %err, "propagation disabled"))
        .ok();

    let current_path = listing::relative_path(&root, &request.dir).unwrap_or_else(|err| {
        let fallback = request.script_name.as_deref().map(script_dir).unwrap_or_default();
        tracing::debug!(error = %err, current_path = %fallback, "using script path");
        fallback
    });

    let (listing, report) = listing::build_at(current_path, &request.dir, &options, asset.as_ref());
    tracing::debug!(%report, "request served");

    let page = render::render_page(&listing, &config.display);
    out.write_all(render::cgi_headers(&config.cgi).as_bytes())?;
    out.write_all(page.into_string().as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    fn response(request: &CgiRequest) -> String {
        let mut out = Vec::new();
        respond(request, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn payload(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("payload.bin");
        fs::write(&path, b"#!/bin/sh\n").unwrap();
        path
    }

    #[test]
    fn script_dir_drops_script_and_slashes() {
        assert_eq!(script_dir("/~ann/photos/index.cgi"), "~ann/photos");
        assert_eq!(script_dir("/index.cgi"), "");
        assert_eq!(script_dir(""), "");
    }

    #[test]
    fn directory_inside_root_uses_relative_path() {
        let tmp = TempDir::new().unwrap();
        let docs = make_dir(tmp.path(), "docs");
        write_file(&docs, "a.txt", 500);

        let html = response(&CgiRequest {
            dir: docs,
            document_root: Some(tmp.path().to_path_buf()),
            script_name: Some("/elsewhere/index.cgi".to_string()),
            asset_path: Some(payload(tmp.path())),
            ..CgiRequest::default()
        });

        assert!(html.starts_with("Content-Type: text/html; charset=utf-8\r\n"));
        assert!(html.contains("Index of /docs/"));
        assert!(html.contains("a.txt"));
    }

    #[test]
    fn directory_outside_root_is_still_listed_and_propagated() {
        let tmp = TempDir::new().unwrap();
        let docroot = make_dir(tmp.path(), "docroot");
        let alias = make_dir(tmp.path(), "alias");
        write_file(&alias, "f.txt", 3);
        let sub = make_dir(&alias, "sub");

        let html = response(&CgiRequest {
            dir: alias,
            document_root: Some(docroot),
            script_name: Some("/~ann/index.cgi".to_string()),
            asset_path: Some(payload(tmp.path())),
            ..CgiRequest::default()
        });

        assert!(html.contains("Index of /~ann/"));
        assert!(html.contains("f.txt"));
        assert!(!html.contains("could not be read"));
        assert!(sub.join("index.cgi").exists());
    }

    #[test]
    fn outside_root_without_script_name_lists_as_root() {
        let tmp = TempDir::new().unwrap();
        let docroot = make_dir(tmp.path(), "docroot");
        let alias = make_dir(tmp.path(), "alias");
        write_file(&alias, "f.txt", 3);

        let html = response(&CgiRequest {
            dir: alias,
            document_root: Some(docroot),
            asset_path: Some(payload(tmp.path())),
            ..CgiRequest::default()
        });

        assert!(html.contains("Index of /<"));
        assert!(html.contains("f.txt"));
    }

    #[test]
    fn unreadable_directory_still_gets_a_page() {
        let tmp = TempDir::new().unwrap();

        let html = response(&CgiRequest {
            dir: tmp.path().join("gone"),
            document_root: Some(tmp.path().to_path_buf()),
            asset_path: Some(payload(tmp.path())),
            ..CgiRequest::default()
        });

        assert!(html.contains("\r\n\r\n<!DOCTYPE html>"));
        assert!(html.contains("Index of /gone/"));
        assert!(html.contains("could not be read"));
    }

    #[test]
    fn missing_payload_disables_propagation_only() {
        let tmp = TempDir::new().unwrap();
        let sub = make_dir(tmp.path(), "sub");

        let html = response(&CgiRequest {
            dir: tmp.path().to_path_buf(),
            document_root: Some(tmp.path().to_path_buf()),
            asset_path: Some(tmp.path().join("absent")),
            ..CgiRequest::default()
        });

        assert!(html.contains(r#"<a href="sub/">sub</a>"#));
        assert!(!sub.join("index.cgi").exists());
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(config::CONFIG_FILENAME), "[[[ not toml").unwrap();
        write_file(tmp.path(), "a.txt", 1);

        let html = response(&CgiRequest {
            dir: tmp.path().to_path_buf(),
            document_root: Some(tmp.path().to_path_buf()),
            asset_path: Some(payload(tmp.path())),
            ..CgiRequest::default()
        });

        assert!(html.contains("Cache-Control: private, max-age=60, no-cache\r\n"));
        assert!(html.contains("a.txt"));
        // Stock exclusions still hide the config file
        assert!(!html.contains(r#"href="dirindex.toml""#));
    }
}
