//! HTML rendering of a [`Listing`].
//!
//! Renderers are pure: they take the listing record and display settings
//! and return markup, without touching the filesystem. Three styles exist:
//!
//! - **Fancy**: responsive list with human-readable sizes, a `DIR` marker
//!   for directories, and a `Download`/`Open` control per row.
//! - **Simple**: one monospace table with human-readable sizes, a `DIR`
//!   marker for directories, and a footer.
//! - **Table**: plain monospace tables (files, then directories) with raw
//!   byte counts.
//!
//! With `show_directory_size`, fancy and simple show a directory's own size
//! in place of `DIR`.
//!
//! Both styles share the same rules:
//!
//! - The heading is `Index of <display path>`.
//! - A parent (`../`) row appears only below the document root.
//! - A listing whose scan failed renders a short notice and no rows; it
//!   never fails to render.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating,
//! so every name and path is escaped automatically.

use crate::config::{self, CgiConfig, DisplayConfig, PageStyle, TimeZoneSetting};
use crate::listing::{Listing, encode_segment};
use crate::size::format_size;
use crate::types::Entry;
use chrono::{DateTime, Local, Utc};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const FANCY_CSS: &str = include_str!("../static/fancy.css");
const TABLE_CSS: &str = include_str!("../static/table.css");

const SCAN_FAILED_NOTICE: &str = "This directory could not be read.";

/// Render the complete page for `listing` in the configured style.
pub fn render_page(listing: &Listing, display: &DisplayConfig) -> Markup {
    match display.style {
        PageStyle::Fancy => render_fancy(listing, display),
        PageStyle::Simple => render_simple(listing, display),
        PageStyle::Table => render_table(listing, display),
    }
}

/// HTTP headers (including the blank separator line) for a CGI response.
pub fn cgi_headers(cgi: &CgiConfig) -> String {
    format!(
        "Content-Type: text/html; charset=utf-8\r\nCache-Control: {}\r\n\r\n",
        cgi.cache_control
    )
}

/// Format a modification time, or an empty string when unknown.
pub fn format_time(modified: Option<DateTime<Utc>>, display: &DisplayConfig) -> String {
    let Some(time) = modified else {
        return String::new();
    };
    let format = &display.date_format;
    match display.timezone {
        TimeZoneSetting::Local => time.with_timezone(&Local).format(format).to_string(),
        TimeZoneSetting::Utc => time.format(format).to_string(),
        TimeZoneSetting::Fixed(offset) => time.with_timezone(&offset).format(format).to_string(),
    }
}

/// Relative link target for an entry. Directories get a trailing slash.
pub fn entry_href(entry: &Entry) -> String {
    let encoded = encode_segment(&entry.name);
    if entry.is_dir() {
        format!("{encoded}/")
    } else {
        encoded
    }
}

/// Size column text: formatted file size, and `DIR` or the directory's own
/// size for directories.
fn size_label(entry: &Entry, display: &DisplayConfig) -> String {
    if entry.is_dir() && !display.show_directory_size {
        "DIR".to_string()
    } else {
        format_size(entry.size())
    }
}

fn footer() -> Markup {
    html! {
        div.text-right {
            "Index powered by dirindex."
        }
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

fn page_title(listing: &Listing) -> String {
    format!("Index of {}", listing.display_path())
}

// ============================================================================
// Fancy style
// ============================================================================

fn render_fancy(listing: &Listing, display: &DisplayConfig) -> Markup {
    let css = format!("{}\n\n{}", config::generate_display_css(display), FANCY_CSS);
    let title = page_title(listing);

    let content = html! {
        div.container {
            h1 { (title) }
            hr;
            @if listing.scan_failed {
                p.notice { (SCAN_FAILED_NOTICE) }
            } @else {
                div.file-list {
                    article.fluid-row.list-head.hidden-small {
                        div.col-left.col-filename { "Filename" }
                        div.col-left.col-datetime { "Last modified" }
                        div.col-left.col-filesize { "Size" }
                    }
                    @if let Some(parent) = listing.parent_href() {
                        article.fluid-row {
                            div.col-left.col-filename { a href=(parent) { "/.." } }
                        }
                    }
                    @for file in &listing.files {
                        (fancy_row(file, display, "Download"))
                    }
                    @for dir in &listing.directories {
                        (fancy_row(dir, display, "Open"))
                    }
                }
            }
            hr;
            @if display.show_footer {
                (footer())
            }
        }
    };

    base_document(&title, &css, content)
}

fn fancy_row(entry: &Entry, display: &DisplayConfig, control: &str) -> Markup {
    let href = entry_href(entry);
    let size = size_label(entry, display);

    html! {
        article.fluid-row {
            div.col-left.col-filename { a href=(href) { (entry.name) } }
            div.col-left.col-datetime { (format_time(entry.modified, display)) }
            div.col-left.col-filesize { (size) }
            div.col-right.col-controls { a href=(href) { (control) } }
        }
    }
}

// ============================================================================
// Simple style
// ============================================================================

fn render_simple(listing: &Listing, display: &DisplayConfig) -> Markup {
    let title = page_title(listing);

    let content = html! {
        div.container {
            h1 { (title) }
            hr;
            @if listing.scan_failed {
                p.notice { (SCAN_FAILED_NOTICE) }
            } @else {
                table {
                    tbody {
                        @if let Some(parent) = listing.parent_href() {
                            tr {
                                td { a href=(parent) { "../" } }
                                td {}
                                td {}
                            }
                        }
                        @for entry in listing.files.iter().chain(&listing.directories) {
                            tr {
                                td { a href=(entry_href(entry)) { (entry.name) } }
                                td { (format_time(entry.modified, display)) }
                                td { (size_label(entry, display)) }
                            }
                        }
                    }
                }
            }
            hr;
            @if display.show_footer {
                (footer())
            }
        }
    };

    base_document(&title, TABLE_CSS, content)
}

// ============================================================================
// Table style
// ============================================================================

fn render_table(listing: &Listing, display: &DisplayConfig) -> Markup {
    let title = page_title(listing);

    let content = html! {
        h1 { (title) }
        hr;
        @if listing.scan_failed {
            p.notice { (SCAN_FAILED_NOTICE) }
        } @else {
            table {
                tbody {
                    @if let Some(parent) = listing.parent_href() {
                        tr {
                            td { a href=(parent) { "../" } }
                            td {}
                            td {}
                        }
                    }
                    @for file in &listing.files {
                        (table_row(file, display))
                    }
                }
            }
            table {
                tbody {
                    @for dir in &listing.directories {
                        (table_row(dir, display))
                    }
                }
            }
        }
        hr;
    };

    base_document(&title, TABLE_CSS, content)
}

fn table_row(entry: &Entry, display: &DisplayConfig) -> Markup {
    html! {
        tr {
            td { a href=(entry_href(entry)) { (entry.name) } }
            td { (format_time(entry.modified, display)) }
            td {
                @if entry.is_dir() {
                    "-"
                } @else {
                    (entry.size())
                }
            }
        }
    }
}
