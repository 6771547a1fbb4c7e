//! The listing record handed to renderers.
//!
//! [`build`] runs one invocation end to end: scan the directory, propagate
//! the generator into every discovered subdirectory, and package the result
//! as a [`Listing`]. A renderer only ever sees the `Listing`; it never
//! touches the filesystem.
//!
//! ## Current path
//!
//! The current path is the scanned directory relative to the document root,
//! derived from the directory structure itself:
//!
//! ```text
//! root = /srv/www      dir = /srv/www            → ""
//! root = /srv/www      dir = /srv/www/docs/api   → "docs/api"
//! root = /srv/www      dir = /etc                → OutsideRoot
//! ```
//!
//! It is never derived by trimming the generator's filename off a request
//! URL, which over-trims directories whose names end the same way. Callers
//! that serve directories mapped in from outside the root supply their own
//! current path through [`build_at`].

use crate::asset::GeneratorAsset;
use crate::config::{ConfigError, IndexConfig};
use crate::exclude::ExclusionSet;
use crate::propagate::{PropagationReport, propagate_all};
use crate::scan::{DirectoryScan, ScanError, scan};
use crate::types::Entry;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListingError {
    #[error("{dir} is not inside the document root {root}")]
    OutsideRoot { dir: PathBuf, root: PathBuf },
}

/// Runtime options for one invocation. The generator's filename travels
/// with the [`GeneratorAsset`] itself.
#[derive(Debug, Clone, Default)]
pub struct ListingOptions {
    pub exclusions: ExclusionSet,
}

impl ListingOptions {
    pub fn from_config(config: &IndexConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            exclusions: config.exclusions()?,
        })
    }
}

/// What a renderer receives for one directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Listing {
    /// Path relative to the document root, `/`-separated; empty at the root
    pub current_path: String,
    pub files: Vec<Entry>,
    pub directories: Vec<Entry>,
    /// The directory could not be read; both sequences are empty
    pub scan_failed: bool,
}

impl Listing {
    /// Package a scan result, degrading a failure to an empty listing.
    pub fn from_scan(current_path: String, scanned: Result<DirectoryScan, ScanError>) -> Self {
        match scanned {
            Ok(DirectoryScan { files, directories }) => Self {
                current_path,
                files,
                directories,
                scan_failed: false,
            },
            Err(err) => {
                tracing::warn!(error = %err, "rendering empty listing");
                Self {
                    current_path,
                    scan_failed: true,
                    ..Self::default()
                }
            }
        }
    }

    pub fn is_root(&self) -> bool {
        self.current_path.is_empty()
    }

    /// Heading path with leading and trailing slash: `/`, `/docs/api/`.
    pub fn display_path(&self) -> String {
        if self.is_root() {
            "/".to_string()
        } else {
            format!("/{}/", self.current_path)
        }
    }

    /// URL of the parent listing, or `None` at the root.
    pub fn parent_href(&self) -> Option<String> {
        if self.is_root() {
            return None;
        }
        match self.current_path.rsplit_once('/') {
            Some((parent, _)) => {
                let encoded: Vec<String> = parent.split('/').map(encode_segment).collect();
                Some(format!("/{}/", encoded.join("/")))
            }
            None => Some("/".to_string()),
        }
    }
}

/// Percent-encode one path segment: everything outside the RFC 3986
/// unreserved set, including `/`, is escaped.
pub fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Scan `dir`, propagate `asset` into its subdirectories, and return the
/// listing together with the propagation outcomes.
///
/// Propagation only runs when the scan succeeded and an asset is given.
pub fn build(
    root: &Path,
    dir: &Path,
    options: &ListingOptions,
    asset: Option<&GeneratorAsset>,
) -> Result<(Listing, PropagationReport), ListingError> {
    let current_path = relative_path(root, dir)?;
    Ok(build_at(current_path, dir, options, asset))
}

/// [`build`] with the current path already known. Never fails: an
/// unreadable directory yields a listing flagged as failed.
pub fn build_at(
    current_path: String,
    dir: &Path,
    options: &ListingOptions,
    asset: Option<&GeneratorAsset>,
) -> (Listing, PropagationReport) {
    let scanned = scan(dir, &options.exclusions);

    let report = match (&scanned, asset) {
        (Ok(result), Some(asset)) => propagate_all(
            result.directories.iter().map(|entry| entry.path.as_path()),
            asset,
        ),
        _ => PropagationReport::default(),
    };

    (Listing::from_scan(current_path, scanned), report)
}

/// `/`-joined path of `dir` relative to `root`. Both are resolved first, so
/// relative paths and symlinked roots compare correctly. `dir` need not
/// exist.
pub fn relative_path(root: &Path, dir: &Path) -> Result<String, ListingError> {
    let root = resolve(root);
    let dir = resolve(dir);

    let rel = dir
        .strip_prefix(&root)
        .map_err(|_| ListingError::OutsideRoot {
            dir: dir.clone(),
            root: root.clone(),
        })?;

    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    Ok(parts.join("/"))
}

/// Canonicalize `path`, or its nearest existing ancestor when it does not
/// exist yet.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match path.file_name() {
        Some(name) => {
            let parent = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            resolve(parent).join(name)
        }
        None => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
    }
}
