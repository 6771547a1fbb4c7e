//! Directory scanning.
//!
//! Lists one directory's immediate entries and splits them into files and
//! subdirectories, each in natural order. The scan is read-only and never
//! recurses; subdirectories get their own listing when they are visited.
//!
//! ## Per-entry rules
//!
//! For every raw entry returned by `read_dir`:
//!
//! 1. Entries the iterator fails to produce are skipped.
//! 2. The name is tested against the [`ExclusionSet`]; the first matching
//!    pattern hides the entry.
//! 3. The entry is classified with `fs::metadata`, which follows symlinks.
//!    Regular files and directories are kept. Anything else, including
//!    broken symlinks, FIFOs, sockets, and entries whose metadata cannot be
//!    read, is silently dropped.
//!
//! ## Failure
//!
//! A directory that cannot be opened yields [`ScanError::Unreadable`]. The
//! caller decides how to degrade; [`crate::listing::Listing::from_scan`]
//! turns it into an empty listing flagged as failed.

use crate::exclude::ExclusionSet;
use crate::naming::sort_natural;
use crate::types::{Entry, EntryKind};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot read directory {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Snapshot of one directory, split by kind and naturally sorted.
#[derive(Debug, Clone, Default)]
pub struct DirectoryScan {
    pub files: Vec<Entry>,
    pub directories: Vec<Entry>,
}

pub fn scan(dir: &Path, exclusions: &ExclusionSet) -> Result<DirectoryScan, ScanError> {
    let read_dir = fs::read_dir(dir).map_err(|source| ScanError::Unreadable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut result = DirectoryScan::default();

    for dir_entry in read_dir.filter_map(|e| e.ok()) {
        let name = dir_entry.file_name().to_string_lossy().to_string();

        if let Some(pattern) = exclusions.matching_pattern(&name) {
            tracing::trace!(name = %name, pattern, "excluded");
            continue;
        }

        match classify(name, dir_entry.path()) {
            Some(entry) if entry.is_dir() => result.directories.push(entry),
            Some(entry) => result.files.push(entry),
            None => {}
        }
    }

    sort_natural(&mut result.files);
    sort_natural(&mut result.directories);

    tracing::debug!(
        dir = %dir.display(),
        files = result.files.len(),
        directories = result.directories.len(),
        "scanned"
    );

    Ok(result)
}

/// Build an [`Entry`] from a path, or `None` when it is neither a regular
/// file nor a directory.
fn classify(name: String, path: PathBuf) -> Option<Entry> {
    let metadata = match fs::metadata(&path) {
        Ok(m) => m,
        Err(err) => {
            tracing::trace!(path = %path.display(), error = %err, "unclassifiable entry dropped");
            return None;
        }
    };

    let kind = if metadata.is_dir() {
        EntryKind::Directory {
            size: metadata.len(),
        }
    } else if metadata.is_file() {
        EntryKind::File {
            size: metadata.len(),
        }
    } else {
        tracing::trace!(path = %path.display(), "special file dropped");
        return None;
    };

    let modified = metadata.modified().ok().map(DateTime::<Utc>::from);

    Some(Entry {
        name,
        path,
        kind,
        modified,
    })
}
