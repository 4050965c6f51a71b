//! Collect-all batch extraction.
//!
//! A batch is processed file by file: every success is kept in selection
//! order, every failure is recorded with its filename, and one bad file never
//! stops the others.

use futures::stream::{self, StreamExt};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, instrument, warn};

use super::{ExtractError, Extractor};
use crate::models::NewsItem;

/// Files read concurrently by [`load_sources`].
pub const PARALLEL_READS: usize = 8;

/// The name and full text of one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub filename: String,
    pub contents: String,
}

impl SourceFile {
    pub fn new(filename: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            contents: contents.into(),
        }
    }
}

/// A per-file failure inside a batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Could not read {filename}: {source}")]
    Read {
        filename: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl BatchError {
    pub fn filename(&self) -> &str {
        match self {
            BatchError::Read { filename, .. } => filename,
            BatchError::Extract(e) => e.filename(),
        }
    }
}

/// Result of a batch: successes and failures, each in input order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub items: Vec<NewsItem>,
    pub failures: Vec<BatchError>,
}

impl BatchOutcome {
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of files the batch saw.
    pub fn total(&self) -> usize {
        self.items.len() + self.failures.len()
    }

    fn record(&mut self, result: Result<NewsItem, BatchError>) {
        match result {
            Ok(item) => self.items.push(item),
            Err(e) => {
                warn!(filename = %e.filename(), error = %e, "Skipping file");
                self.failures.push(e);
            }
        }
    }
}

/// Extract every file, collecting successes and failures.
///
/// One failing file never stops the others. Each failure is logged and kept
/// on the outcome.
///
/// # Arguments
///
/// * `extractor` - Extractor carrying the policy to apply
/// * `files` - Loaded files, or the read errors that replaced them
///
/// # Returns
///
/// A [`BatchOutcome`] with items and failures, each in input order.
pub fn extract_batch<I>(extractor: &Extractor, files: I) -> BatchOutcome
where
    I: IntoIterator<Item = Result<SourceFile, BatchError>>,
{
    let mut outcome = BatchOutcome::default();
    for file in files {
        let result = file.and_then(|file| {
            extractor
                .extract(&file.contents, &file.filename)
                .map_err(BatchError::from)
        });
        outcome.record(result);
    }
    info!(
        total = outcome.total(),
        extracted = outcome.items.len(),
        failed = outcome.failures.len(),
        "Batch extraction finished"
    );
    outcome
}

/// Read files from disk concurrently, keeping the order of `paths`.
///
/// # Arguments
///
/// * `paths` - Files to read
///
/// # Returns
///
/// One entry per path. Contents are decoded as UTF-8 with replacement
/// characters for invalid bytes. Unreadable files become
/// [`BatchError::Read`] entries.
#[instrument(level = "info", skip_all, fields(count = paths.len()))]
pub async fn load_sources(paths: &[PathBuf]) -> Vec<Result<SourceFile, BatchError>> {
    stream::iter(paths)
        .map(|path| read_source(path))
        .buffered(PARALLEL_READS)
        .collect()
        .await
}

async fn read_source(path: &Path) -> Result<SourceFile, BatchError> {
    let filename = display_name(path);
    match fs::read(path).await {
        Ok(bytes) => Ok(SourceFile {
            contents: String::from_utf8_lossy(&bytes).into_owned(),
            filename,
        }),
        Err(source) => Err(BatchError::Read { filename, source }),
    }
}

/// File name component of `path`, or the whole path when it has none.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(name: &str, xml: &str) -> Result<SourceFile, BatchError> {
        Ok(SourceFile::new(name, xml))
    }

    #[test]
    fn test_batch_continues_past_malformed_file() {
        let files = vec![
            ok("one.xml", "<newsitem><headline>One</headline></newsitem>"),
            ok("two.xml", "<newsitem><headline>Two</headline>"),
            ok("three.xml", "<newsitem><headline>Three</headline></newsitem>"),
        ];
        let outcome = extract_batch(&Extractor::default(), files);

        assert_eq!(outcome.items.len(), 2);
        assert_eq!(outcome.items[0].headline, "One");
        assert_eq!(outcome.items[1].headline, "Three");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].filename(), "two.xml");
        assert!(matches!(
            outcome.failures[0],
            BatchError::Extract(ExtractError::InvalidXmlStructure { .. })
        ));
        assert_eq!(outcome.total(), 3);
        assert!(!outcome.is_complete_success());
    }

    #[test]
    fn test_batch_collects_all_failures() {
        let files = vec![
            ok("a.xml", "<story>no root</story>"),
            Err(BatchError::Read {
                filename: "b.xml".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "gone"),
            }),
            ok("c.xml", "not xml <"),
        ];
        let outcome = extract_batch(&Extractor::default(), files);

        assert!(outcome.items.is_empty());
        let names: Vec<&str> = outcome.failures.iter().map(|f| f.filename()).collect();
        assert_eq!(names, ["a.xml", "b.xml", "c.xml"]);
        assert_eq!(
            outcome.failures[0].to_string(),
            "No <newsitem> tag found in a.xml"
        );
    }

    #[test]
    fn test_empty_batch() {
        let outcome = extract_batch(&Extractor::default(), Vec::new());
        assert_eq!(outcome.total(), 0);
        assert!(outcome.is_complete_success());
    }

    #[tokio::test]
    async fn test_load_sources_keeps_order_and_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.xml");
        let second = dir.path().join("second.xml");
        std::fs::write(&first, "<newsitem><headline>First</headline></newsitem>").unwrap();
        std::fs::write(&second, b"<newsitem><headline>Caf\xE9</headline></newsitem>").unwrap();
        let missing = dir.path().join("missing.xml");

        let sources = load_sources(&[second.clone(), missing, first.clone()]).await;

        assert_eq!(sources.len(), 3);
        let second_src = sources[0].as_ref().unwrap();
        assert_eq!(second_src.filename, "second.xml");
        assert!(second_src.contents.contains("Caf\u{FFFD}"));
        assert!(matches!(
            &sources[1],
            Err(BatchError::Read { filename, .. }) if filename == "missing.xml"
        ));
        assert_eq!(sources[2].as_ref().unwrap().filename, "first.xml");

        let outcome = extract_batch(&Extractor::default(), sources);
        assert_eq!(outcome.items.len(), 2);
        assert_eq!(outcome.items[0].headline, "Caf\u{FFFD}");
        assert_eq!(outcome.items[1].headline, "First");
        assert_eq!(outcome.failures.len(), 1);
    }
}
