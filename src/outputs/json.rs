//! JSON export of a review session.
//!
//! The export is a single document holding the items in session order:
//!
//! ```text
//! {
//!   "local_date": "2024-03-18",
//!   "local_time": "14:02:11",
//!   "item_count": 2,
//!   "items": [ { "id": "...", "filename": "...", "headline": "...", ... } ]
//! }
//! ```

use chrono::Local;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::NewsItem;
use crate::utils::ensure_parent_writable;

/// Serializable view over the items being exported.
#[derive(Debug, Serialize)]
pub struct ReviewExport<'a> {
    /// The export date in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The export time in `HH:MM:SS` format.
    pub local_time: String,
    pub item_count: usize,
    pub items: Vec<&'a NewsItem>,
}

impl<'a> ReviewExport<'a> {
    pub fn new(items: Vec<&'a NewsItem>) -> Self {
        let now = Local::now();
        Self {
            local_date: now.date_naive().to_string(),
            local_time: now.format("%H:%M:%S").to_string(),
            item_count: items.len(),
            items,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Write `items` as a [`ReviewExport`] to `path`.
///
/// # Arguments
///
/// * `items` - Items to export, in listing order
/// * `path` - Destination file; missing parent directories are created
///
/// # Errors
///
/// Returns an error if serialization fails or the file cannot be written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_export(items: Vec<&NewsItem>, path: &Path) -> Result<(), Box<dyn Error>> {
    let export = ReviewExport::new(items);
    let json = export.to_json()?;

    ensure_parent_writable(path).await?;
    fs::write(path, json).await?;
    info!(count = export.item_count, "Wrote JSON export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_item;

    #[test]
    fn test_export_shape() {
        let a = sample_item("a.xml", "Alpha");
        let b = sample_item("b.xml", "Beta").with_summary("Short.");
        let export = ReviewExport::new(vec![&a, &b]);
        let value: serde_json::Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();

        assert_eq!(value["item_count"], 2);
        assert_eq!(value["items"][0]["filename"], "a.xml");
        assert_eq!(value["items"][0]["metadata"]["mediaType"], "print");
        assert!(value["items"][0].get("aiSummary").is_none());
        assert_eq!(value["items"][1]["aiSummary"], "Short.");
        assert_eq!(value["local_date"].as_str().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_write_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/review.json");
        let item = sample_item("a.xml", "Alpha");

        write_export(vec![&item], &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["items"][0]["id"], item.id.to_string());
    }
}
