//! Human-readable byte counts.
//!
//! Sizes are shown as a rounded value in the largest binary unit that keeps
//! it at or above one: `1536` → `2 KB`. Two edge cases:
//!
//! - Zero renders as the bare number `0`, not `0 B`.
//! - Anything at or above 1024 GB has no unit in the table and renders as
//!   the raw decimal byte count.

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Format a byte count for display.
///
/// ```
/// use dirindex::size::format_size;
///
/// assert_eq!(format_size(0), "0");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1024), "1 KB");
/// assert_eq!(format_size(1024 * 1024), "1 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return bytes.to_string();
    }

    let index = unit_index(bytes);
    match UNITS.get(index) {
        Some(unit) => {
            let scaled = bytes as f64 / 1024f64.powi(index as i32);
            format!("{} {}", scaled.round() as u64, unit)
        }
        None => bytes.to_string(),
    }
}

/// Format a raw signed size, reinterpreting it as unsigned first.
///
/// Some platforms and FFI layers hand out sizes as signed integers that
/// wrap for very large files. The bit pattern is the real size.
pub fn format_signed_size(raw: i64) -> String {
    format_size(raw as u64)
}

/// `floor(log1024(bytes))` for a non-zero count, without floating point.
fn unit_index(mut bytes: u64) -> usize {
    let mut index = 0;
    while bytes >= 1024 {
        bytes /= 1024;
        index += 1;
    }
    index
}
