//! # dirindex
//!
//! A directory listing generator that propagates itself. Pointed at a
//! directory, it lists the files and subdirectories there and renders an
//! `Index of /path/` page. It also drops a copy of itself into every
//! subdirectory, so the next request for a subdirectory can list that one.
//!
//! # Architecture: One Pass Per Directory
//!
//! Every invocation recomputes everything from the filesystem. Nothing is
//! cached and nothing runs in the background:
//!
//! ```text
//! 1. Scan       dir/        →  files + directories   (exclusions, natural sort)
//! 2. Propagate  dir/*/      →  dir/*/index.cgi       (only when stale)
//! 3. Render     Listing     →  HTML page             (fancy or table style)
//! ```
//!
//! The scan and propagation stages form the core. Rendering only consumes
//! the [`listing::Listing`] record, so any other presentation can replace it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Lists one directory, applies exclusions, classifies and sorts entries |
//! | [`propagate`] | Writes the generator into subdirectories whose copy is missing or stale |
//! | [`listing`] | Runs scan + propagate and builds the record renderers consume |
//! | [`render`] | Maud HTML pages and CGI headers |
//! | [`cgi`] | One complete CGI response, degrading instead of failing |
//! | [`config`] | `dirindex.toml` loading, merging over stock defaults, validation |
//! | [`exclude`] | Glob-based exclusion set matched against entry names |
//! | [`naming`] | Natural ordering (`file2` before `file10`) |
//! | [`size`] | Human-readable byte counts |
//! | [`asset`] | The generator payload and its reference modification time |
//! | [`types`] | `Entry` and `EntryKind`, shared by every stage |
//! | [`output`] | CLI output formatting for listings and propagation reports |
//!
//! # Design Decisions
//!
//! ## Injected Payload
//!
//! The propagated payload is a [`asset::GeneratorAsset`]: bytes, a name,
//! and a reference time. The CLI fills it from the running executable, but
//! the core never reads its own binary, which keeps propagation testable
//! with synthetic bytes.
//!
//! ## Modification Times, Not Hashes
//!
//! A subdirectory's copy is rewritten only when it is missing or older than
//! the reference. Comparing timestamps costs one `stat` per subdirectory, and
//! an up-to-date tree sees no writes at all, so repeated requests do not
//! keep bumping modification times.
//!
//! ## Lenient Failure
//!
//! Nothing in the core terminates the process. An unreadable directory
//! renders as an empty page flagged as failed. An unwritable subdirectory
//! is skipped and logged. Entries that are neither files nor directories,
//! such as broken symlinks, are silently left out.

pub mod asset;
pub mod cgi;
pub mod config;
pub mod exclude;
pub mod listing;
pub mod naming;
pub mod output;
pub mod propagate;
pub mod render;
pub mod scan;
pub mod size;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
