//! Generator propagation into subdirectories.
//!
//! Every directory that is listed makes sure each of its subdirectories
//! holds a current copy of the [`GeneratorAsset`], so the next request for
//! that subdirectory can render its own listing.
//!
//! ## Staleness
//!
//! A subdirectory's copy is stale when:
//!
//! - no entry named `asset.name` exists in it, or
//! - that entry's modification time is strictly earlier than
//!   `asset.modified`, or
//! - that entry's modification time cannot be read.
//!
//! Stale copies are replaced unconditionally with no backup or merge. The
//! new copy is staged in a temporary file next to the target, given the
//! asset's permissions, and renamed over the target. A failed write leaves
//! the old copy (and its old modification time) in place, so the next pass
//! retries it. Current copies are left alone: a freshly written file is never older than
//! the reference time, so a second pass over an unchanged tree writes
//! nothing and does not keep bumping modification times.
//!
//! ## Failures
//!
//! A subdirectory that cannot be opened or written is skipped. The skip is
//! logged and recorded in the [`PropagationReport`], and never affects
//! siblings or the parent listing.
//!
//! ## Concurrency
//!
//! There is no locking. Two invocations racing on the same subdirectory may
//! both decide it is stale and both write; the last writer wins. Both write
//! the same payload, so the race is accepted rather than guarded.

use crate::asset::GeneratorAsset;
use crate::exclude::ExclusionSet;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PropagateError {
    #[error("cannot open {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot walk directory tree: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result of a successful propagation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// The copy was missing or stale and has been rewritten
    Written,
    /// The copy was already current; nothing was written
    Current,
}

/// Outcome recorded per directory in a [`PropagationReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropagationOutcome {
    Written,
    Current,
    Skipped(String),
}

impl fmt::Display for PropagationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropagationOutcome::Written => write!(f, "written"),
            PropagationOutcome::Current => write!(f, "current"),
            PropagationOutcome::Skipped(reason) => write!(f, "skipped ({reason})"),
        }
    }
}

impl From<Result<Propagation, PropagateError>> for PropagationOutcome {
    fn from(result: Result<Propagation, PropagateError>) -> Self {
        match result {
            Ok(Propagation::Written) => PropagationOutcome::Written,
            Ok(Propagation::Current) => PropagationOutcome::Current,
            Err(err) => PropagationOutcome::Skipped(err.to_string()),
        }
    }
}

/// Per-directory outcomes of one propagation pass, in visit order.
#[derive(Debug, Clone, Default)]
pub struct PropagationReport {
    pub outcomes: Vec<(PathBuf, PropagationOutcome)>,
}

impl PropagationReport {
    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, PropagationOutcome::Written))
    }

    pub fn current(&self) -> usize {
        self.count(|o| matches!(o, PropagationOutcome::Current))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, PropagationOutcome::Skipped(_)))
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, pred: impl Fn(&PropagationOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }

    fn record(&mut self, dir: PathBuf, result: Result<Propagation, PropagateError>) {
        if let Err(err) = &result {
            tracing::warn!(dir = %dir.display(), error = %err, "propagation skipped");
        }
        self.outcomes.push((dir, result.into()));
    }
}

impl fmt::Display for PropagationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} written, {} current, {} skipped",
            self.written(),
            self.current(),
            self.skipped()
        )
    }
}

/// Ensure `dir` holds a current copy of `asset`.
pub fn propagate(dir: &Path, asset: &GeneratorAsset) -> Result<Propagation, PropagateError> {
    if !is_stale(dir, asset)? {
        tracing::trace!(dir = %dir.display(), "generator current");
        return Ok(Propagation::Current);
    }

    let target = dir.join(&asset.name);
    let write_err = |source: std::io::Error| PropagateError::Write {
        path: target.clone(),
        source,
    };

    let prefix = format!(".{}.", asset.name);
    let mut staged = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    staged.write_all(&asset.bytes).map_err(write_err)?;
    if let Some(permissions) = &asset.permissions {
        staged
            .as_file()
            .set_permissions(permissions.clone())
            .map_err(write_err)?;
    }
    // Dropping the staged file on any error above removes it
    staged
        .persist(&target)
        .map_err(|err| write_err(err.error))?;

    tracing::debug!(path = %target.display(), bytes = asset.bytes.len(), "generator written");
    Ok(Propagation::Written)
}

/// Propagate into each directory in turn. Failures are recorded, not raised.
pub fn propagate_all<'a, I>(dirs: I, asset: &GeneratorAsset) -> PropagationReport
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut report = PropagationReport::default();
    for dir in dirs {
        report.record(dir.to_path_buf(), propagate(dir, asset));
    }
    report
}

/// Propagate into every directory below `root`, at any depth.
///
/// Directories whose name matches `exclusions` are pruned along with their
/// subtree. Symlinks are not followed. `root` itself is not touched.
pub fn propagate_tree(
    root: &Path,
    exclusions: &ExclusionSet,
    asset: &GeneratorAsset,
) -> PropagationReport {
    let mut report = PropagationReport::default();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !e.file_type().is_dir() || !exclusions.is_excluded(&e.file_name().to_string_lossy())
        });

    for item in walker {
        match item {
            Ok(entry) if entry.file_type().is_dir() => {
                report.record(entry.path().to_path_buf(), propagate(entry.path(), asset));
            }
            Ok(_) => {}
            Err(err) => {
                let dir = err.path().unwrap_or(root).to_path_buf();
                report.record(dir, Err(err.into()));
            }
        }
    }

    report
}

/// Decide whether `dir` needs a fresh copy of the asset.
fn is_stale(dir: &Path, asset: &GeneratorAsset) -> Result<bool, PropagateError> {
    let read_dir = fs::read_dir(dir).map_err(|source| PropagateError::Unreadable {
        path: dir.to_path_buf(),
        source,
    })?;

    let found = read_dir
        .filter_map(|e| e.ok())
        .any(|e| e.file_name() == OsStr::new(&asset.name));

    if !found {
        return Ok(true);
    }

    let existing: Option<SystemTime> = fs::metadata(dir.join(&asset.name))
        .and_then(|m| m.modified())
        .ok();

    Ok(match existing {
        Some(mtime) => mtime < asset.modified,
        None => true,
    })
}
