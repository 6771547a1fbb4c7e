//! CLI output formatting.
//!
//! Console output mirrors the listing page: a heading, then files, then
//! directories, each entry as a positional header line with indented
//! context lines.
//!
//! ```text
//! Index of /docs/
//! Files
//! 001 a.txt
//!     Size: 500 B
//!     Modified: 05-Mar-2024 14:07
//! Directories
//! 001 api/
//!     Modified: 04-Mar-2024 09:12
//!
//! Propagation
//!     api: written
//!     old: current
//! 1 written, 1 current, 0 skipped
//! ```
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::config::DisplayConfig;
use crate::listing::Listing;
use crate::propagate::PropagationReport;
use crate::render::format_time;
use crate::size::format_size;
use crate::types::Entry;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn entry_lines(index: usize, entry: &Entry, display: &DisplayConfig) -> Vec<String> {
    let mut lines = Vec::new();
    if entry.is_dir() {
        lines.push(format!("{} {}/", format_index(index), entry.name));
    } else {
        lines.push(format!("{} {}", format_index(index), entry.name));
    }
    if !entry.is_dir() {
        lines.push(format!("{}Size: {}", indent(1), format_size(entry.size())));
    }
    let modified = format_time(entry.modified, display);
    if !modified.is_empty() {
        lines.push(format!("{}Modified: {}", indent(1), modified));
    }
    lines
}

/// Format a listing as console lines.
pub fn format_listing(listing: &Listing, display: &DisplayConfig) -> Vec<String> {
    let mut lines = vec![format!("Index of {}", listing.display_path())];

    if listing.scan_failed {
        lines.push(format!("{}(directory could not be read)", indent(1)));
        return lines;
    }

    if !listing.files.is_empty() {
        lines.push("Files".to_string());
        for (i, file) in listing.files.iter().enumerate() {
            lines.extend(entry_lines(i + 1, file, display));
        }
    }

    if !listing.directories.is_empty() {
        lines.push("Directories".to_string());
        for (i, dir) in listing.directories.iter().enumerate() {
            lines.extend(entry_lines(i + 1, dir, display));
        }
    }

    if listing.files.is_empty() && listing.directories.is_empty() {
        lines.push(format!("{}(empty)", indent(1)));
    }

    lines
}

/// Format propagation outcomes, with paths shown relative to `base`.
pub fn format_propagation(report: &PropagationReport, base: &Path) -> Vec<String> {
    let mut lines = vec!["Propagation".to_string()];
    for (dir, outcome) in &report.outcomes {
        let shown = dir.strip_prefix(base).unwrap_or(dir);
        lines.push(format!("{}{}: {}", indent(1), shown.display(), outcome));
    }
    lines.push(report.to_string());
    lines
}

pub fn print_listing(listing: &Listing, display: &DisplayConfig) {
    for line in format_listing(listing, display) {
        println!("{}", line);
    }
}

pub fn print_propagation(report: &PropagationReport, base: &Path) {
    for line in format_propagation(report, base) {
        println!("{}", line);
    }
}
