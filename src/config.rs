//! Listing configuration.
//!
//! Handles loading, validating, and merging `dirindex.toml`. The file is
//! looked up in the document root (or passed explicitly with `--config`)
//! and is sparse: stock defaults are the base layer and user values are
//! merged on top.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! exclude = ["index.cgi", "dirindex.toml", ".", ".."]
//! generator_name = "index.cgi"
//!
//! [display]
//! style = "fancy"                 # "fancy", "simple" or "table"
//! date_format = "%d-%b-%Y %H:%M"  # strftime syntax
//! timezone = "local"              # "local", "UTC" or an offset like "+01:00"
//! border_radius = "8px"           # corner radius of the fancy list
//! show_footer = true
//! show_directory_size = false     # size column shows "DIR" unless set
//!
//! [cgi]
//! cache_control = "private, max-age=60, no-cache"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::exclude::{ExcludeError, ExclusionSet};
use chrono::FixedOffset;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config filename looked up in the document root.
pub const CONFIG_FILENAME: &str = "dirindex.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Exclude(#[from] ExcludeError),
}

/// Configuration loaded from `dirindex.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Glob patterns for entry names hidden from every listing.
    pub exclude: Vec<String>,
    /// Filename the generator is propagated under in each subdirectory.
    pub generator_name: String,
    /// Page presentation settings.
    pub display: DisplayConfig,
    /// Response settings used when running as a CGI program.
    pub cgi: CgiConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            exclude: vec![
                "index.cgi".to_string(),
                CONFIG_FILENAME.to_string(),
                ".".to_string(),
                "..".to_string(),
            ],
            generator_name: "index.cgi".to_string(),
            display: DisplayConfig::default(),
            cgi: CgiConfig::default(),
        }
    }
}

impl IndexConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generator_name.is_empty() {
            return Err(ConfigError::Validation(
                "generator_name must not be empty".into(),
            ));
        }
        if self.generator_name.contains(['/', '\\']) || self.generator_name == ".." {
            return Err(ConfigError::Validation(
                "generator_name must be a plain filename".into(),
            ));
        }
        if self.display.date_format.is_empty() {
            return Err(ConfigError::Validation(
                "display.date_format must not be empty".into(),
            ));
        }
        if StrftimeItems::new(&self.display.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Validation(format!(
                "display.date_format is not a valid strftime format: {}",
                self.display.date_format
            )));
        }
        self.exclusions()?;
        Ok(())
    }

    /// Compile the exclude patterns.
    pub fn exclusions(&self) -> Result<ExclusionSet, ConfigError> {
        Ok(ExclusionSet::new(&self.exclude)?)
    }
}

/// Page style, mirroring the layouts the listing can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStyle {
    /// Responsive list with formatted sizes and per-row controls.
    #[default]
    Fancy,
    /// One monospace table with formatted sizes, `DIR` markers and a footer.
    Simple,
    /// Plain monospace tables with raw byte sizes.
    Table,
}

/// Time zone modification times are shown in.
///
/// Written in TOML as `"local"`, `"UTC"`, or a fixed offset such as
/// `"+01:00"`. Named zones with daylight saving rules are not supported;
/// use the offset in effect instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeZoneSetting {
    /// The server's local time zone.
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl TryFrom<String> for TimeZoneSetting {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "local" | "Local" => Ok(Self::Local),
            "utc" | "UTC" | "Z" => Ok(Self::Utc),
            offset => offset.parse::<FixedOffset>().map(Self::Fixed).map_err(|_| {
                format!(
                    "unknown timezone {offset:?}, expected \"local\", \"UTC\" or an offset like \"+01:00\""
                )
            }),
        }
    }
}

impl From<TimeZoneSetting> for String {
    fn from(value: TimeZoneSetting) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeZoneSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Utc => write!(f, "UTC"),
            Self::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

/// Page presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub style: PageStyle,
    /// chrono strftime format for modification times.
    pub date_format: String,
    pub timezone: TimeZoneSetting,
    /// Corner radius of the fancy list (CSS value).
    pub border_radius: String,
    pub show_footer: bool,
    /// Show each directory's own size instead of `DIR` (fancy and simple).
    pub show_directory_size: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            style: PageStyle::Fancy,
            date_format: "%d-%b-%Y %H:%M".to_string(),
            timezone: TimeZoneSetting::Local,
            border_radius: "8px".to_string(),
            show_footer: true,
            show_directory_size: false,
        }
    }
}

/// CGI response settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CgiConfig {
    /// Value of the `Cache-Control` response header.
    pub cache_control: String,
}

impl Default for CgiConfig {
    fn default() -> Self {
        Self {
            cache_control: "private, max-age=60, no-cache".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(IndexConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so an
///   `exclude` list in a user file replaces the stock list.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<IndexConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: IndexConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `dirindex.toml` in the given directory.
///
/// Uses stock defaults when the file doesn't exist.
pub fn load_config(dir: &Path) -> Result<IndexConfig, ConfigError> {
    let path = dir.join(CONFIG_FILENAME);
    if !path.exists() {
        return resolve_config(None);
    }
    load_config_file(&path)
}

/// Load config from an explicit file path. The file must exist.
pub fn load_config_file(path: &Path) -> Result<IndexConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Returns a fully-commented stock `dirindex.toml` with all keys explained.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# dirindex configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the document root as dirindex.toml, or pass it with
# --config. Unknown keys will cause an error.

# Glob patterns for entry names hidden from every listing. Matched against
# the bare name, first match wins. Setting this replaces the whole list, so
# keep the generator's own filename in it.
exclude = ["index.cgi", "dirindex.toml", ".", ".."]

# Filename the generator is copied to in every subdirectory.
generator_name = "index.cgi"

# ---------------------------------------------------------------------------
# Page display
# ---------------------------------------------------------------------------
[display]
# "fancy":  responsive list with human-readable sizes.
# "simple": one monospace table with human-readable sizes.
# "table":  plain monospace tables with raw byte counts.
style = "fancy"

# Modification time format (strftime syntax).
date_format = "%d-%b-%Y %H:%M"

# Time zone for modification times: "local", "UTC", or a fixed offset
# such as "+01:00".
timezone = "local"

# Corner radius of the fancy list (CSS value).
border_radius = "8px"

# Show the "Index powered by dirindex" footer (fancy and simple).
show_footer = true

# Show each directory's own size (as reported by the filesystem) instead
# of "DIR" in the fancy and simple styles.
show_directory_size = false

# ---------------------------------------------------------------------------
# CGI responses
# ---------------------------------------------------------------------------
[cgi]
# Cache-Control header sent with every listing.
cache_control = "private, max-age=60, no-cache"
"##
}

/// Generate CSS custom properties from display config.
pub fn generate_display_css(display: &DisplayConfig) -> String {
    format!(
        r#":root {{
    --list-border-radius: {border_radius};
}}"#,
        border_radius = display.border_radius,
    )
}
