//! Shared test utilities for the dirindex test suite.
//!
//! Fixture builders for small directory trees, modification-time helpers,
//! and extractors that keep assertions short.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_file(tmp.path(), "a.txt", 500);
//! let sub = make_dir(tmp.path(), "sub");
//! set_mtime(&sub, 1_600_000_000);
//!
//! let asset = synthetic_asset("index.gen", 1_600_000_000);
//! ```

use crate::asset::GeneratorAsset;
use crate::types::Entry;
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// =========================================================================
// Fixture setup
// =========================================================================

/// Write a file of `size` zero bytes.
pub fn write_file(dir: &Path, name: &str, size: usize) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, vec![0u8; size]).unwrap();
    path
}

/// Create a subdirectory and return its path.
pub fn make_dir(parent: &Path, name: &str) -> PathBuf {
    let path = parent.join(name);
    fs::create_dir_all(&path).unwrap();
    path
}

/// A generator asset with fixed bytes and a reference time of `secs`
/// since the epoch.
pub fn synthetic_asset(name: &str, secs: u64) -> GeneratorAsset {
    GeneratorAsset::new(
        name,
        format!("generator payload @{secs}"),
        UNIX_EPOCH + Duration::from_secs(secs),
    )
}

// =========================================================================
// Modification times
// =========================================================================

pub fn set_mtime(path: &Path, secs: i64) {
    filetime::set_file_mtime(path, FileTime::from_unix_time(secs, 0)).unwrap();
}

pub fn mtime_secs(path: &Path) -> i64 {
    let metadata = fs::metadata(path).unwrap();
    FileTime::from_last_modification_time(&metadata).unix_seconds()
}

pub fn unix_secs(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH).unwrap().as_secs() as i64
}

// =========================================================================
// Extractors
// =========================================================================

/// Entry names in order.
pub fn names(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.name.as_str()).collect()
}
