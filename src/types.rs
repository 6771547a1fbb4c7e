//! Shared types produced by the scanner and consumed by every renderer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// What a listed entry is.
///
/// A directory's size is the size of the directory node itself as the
/// filesystem reports it, not the total of its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntryKind {
    File { size: u64 },
    Directory { size: u64 },
}

/// One filesystem object discovered by a scan.
///
/// Built fresh on every scan and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// Display name (lossy UTF-8 of the on-disk name)
    pub name: String,
    /// Real on-disk path, used for propagation
    #[serde(skip)]
    pub path: PathBuf,
    #[serde(flatten)]
    pub kind: EntryKind,
    /// Last modification time, when the platform reports one
    pub modified: Option<DateTime<Utc>>,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory { .. })
    }

    pub fn size(&self) -> u64 {
        match self.kind {
            EntryKind::File { size } | EntryKind::Directory { size } => size,
        }
    }
}
