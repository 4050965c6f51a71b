//! Utility functions for string handling and output paths.
//!
//! - String truncation for logging
//! - Slugification for Markdown anchors
//! - Output path validation before exports are written

use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (backing off to a character
/// boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Convert a title to a URL-friendly slug.
///
/// Used to generate anchor links in the Markdown report. Lowercases the
/// text, removes special characters, and replaces spaces with hyphens.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify_title("Hello World"), "hello-world");
/// assert_eq!(slugify_title("Test-Article!"), "test-article");
/// ```
pub fn slugify_title(title: &str) -> String {
    title
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .replace(' ', "-")
}

/// Make sure the directory that will hold `path` exists and is writable.
///
/// Creates missing parent directories, then writes and removes a scratch
/// file. A scratch file that cannot be removed is logged and left behind.
///
/// # Arguments
///
/// * `path` - Output file about to be written
///
/// # Errors
///
/// Returns an error if the directory cannot be created or written to.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_writable(path: &Path) -> Result<(), Box<dyn Error>> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).await?;

    // Try a small sync write using std fs (simpler error surface)
    let scratch_path = dir.join("..__write_check__");
    stdfs::File::create(&scratch_path)?;
    if let Err(e) = stdfs::remove_file(&scratch_path) {
        warn!(path = %scratch_path.display(), error = %e, "Could not remove write check file");
    }
    info!(dir = %dir.display(), "Output directory is writable");
    Ok(())
}
