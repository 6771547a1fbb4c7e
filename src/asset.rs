//! The generator payload copied into subdirectories.
//!
//! A [`GeneratorAsset`] is plain data: a canonical filename, the bytes to
//! write, and the reference modification time used to decide staleness.
//! It is read once at startup and never changes during an invocation.
//!
//! In a CGI deployment the payload is the running executable itself, so
//! every directory ends up with its own copy of the listing program. Tests
//! and embedders construct the asset from synthetic bytes instead.

use std::fs::{self, Permissions};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("cannot read generator asset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot locate the running executable: {0}")]
    CurrentExe(#[source] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct GeneratorAsset {
    /// Filename the asset is written under in each subdirectory
    pub name: String,
    pub bytes: Vec<u8>,
    /// Copies older than this are rewritten
    pub modified: SystemTime,
    /// Applied to every written copy, e.g. to keep a CGI binary
    /// executable. Without it copies keep the owner-only mode of a fresh
    /// temporary file.
    pub permissions: Option<Permissions>,
}

impl GeneratorAsset {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>, modified: SystemTime) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            modified,
            permissions: None,
        }
    }

    /// Read the payload and its modification time from `path`.
    pub fn from_file(path: &Path, name: impl Into<String>) -> Result<Self, AssetError> {
        let read_err = |source: std::io::Error| AssetError::Read {
            path: path.to_path_buf(),
            source,
        };
        let metadata = fs::metadata(path).map_err(read_err)?;
        let modified = metadata.modified().map_err(read_err)?;
        let bytes = fs::read(path).map_err(read_err)?;

        Ok(Self {
            name: name.into(),
            bytes,
            modified,
            permissions: Some(metadata.permissions()),
        })
    }

    /// Use the running executable as the payload.
    pub fn from_current_exe(name: impl Into<String>) -> Result<Self, AssetError> {
        let exe = std::env::current_exe().map_err(AssetError::CurrentExe)?;
        Self::from_file(&exe, name)
    }
    /// Read the payload from `path` when given, otherwise from the running
    /// executable.
    pub fn load(path: Option<&Path>, name: impl Into<String>) -> Result<Self, AssetError> {
        match path {
            Some(path) => Self::from_file(path, name),
            None => Self::from_current_exe(name),
        }
    }
}
