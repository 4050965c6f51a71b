//! Markdown report of a review session.
//!
//! One section per item with its metadata, story, and summary, followed by
//! the files that could not be extracted.

use chrono::Local;
use itertools::Itertools;
use std::error::Error;
use std::fmt::Write;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::extractor::BatchError;
use crate::models::NewsItem;
use crate::utils::{ensure_parent_writable, slugify_title};

/// Render the report.
pub fn review_to_markdown(items: &[&NewsItem], failures: &[BatchError]) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# News Item Review\n");
    let _ = writeln!(
        md,
        "_Generated {}: {} item(s), {} failed file(s)._\n",
        Local::now().format("%Y-%m-%d %H:%M"),
        items.len(),
        failures.len()
    );

    if !items.is_empty() {
        let _ = writeln!(md, "## Contents\n");
        for item in items {
            let _ = writeln!(
                md,
                "- [{}](#{}) <small>`{}`</small>",
                display_headline(item),
                slugify_title(display_headline(item)),
                item.filename
            );
        }
        md.push('\n');
    }

    for item in items {
        write_item(&mut md, item);
    }

    if !failures.is_empty() {
        let _ = writeln!(md, "## Failed files\n");
        for failure in failures {
            let _ = writeln!(md, "- {failure}");
        }
    }

    md
}

fn display_headline(item: &NewsItem) -> &str {
    if item.headline.is_empty() {
        &item.filename
    } else {
        &item.headline
    }
}

fn write_item(md: &mut String, item: &NewsItem) {
    let meta = &item.metadata;
    let _ = writeln!(md, "## {}\n", display_headline(item));
    if !item.subheadline.is_empty() {
        let _ = writeln!(md, "### {}\n", item.subheadline);
    }
    let _ = writeln!(md, "By **{}**\n", item.byline);

    let details = [
        ("File", item.filename.as_str()),
        ("Source", meta.source.name.as_str()),
        ("Country", meta.source.country.as_str()),
        ("Date", meta.doc_date.as_str()),
        ("Page", meta.physical_position.as_str()),
        ("Language", meta.language.as_str()),
        ("Media type", meta.media_type.as_str()),
    ]
    .iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(label, value)| format!("{label}: {value}"))
    .join(" · ");
    let _ = writeln!(md, "{details}\n");
    let _ = writeln!(
        md,
        "Section: {} ({})\n",
        meta.logical_position.value, meta.logical_position.kind
    );

    if !item.intro.is_empty() {
        let _ = writeln!(md, "> {}\n", item.intro);
    }
    let _ = writeln!(md, "{}\n", item.story);
    let _ = writeln!(md, "<small>{} characters</small>\n", item.story_chars());

    if let Some(summary) = &item.ai_summary {
        let _ = writeln!(md, "**AI summary:** {summary}\n");
    }
}

/// Write the report to `path`.
///
/// # Arguments
///
/// * `items` - Items to report on, in listing order
/// * `failures` - Files that could not be extracted
/// * `path` - Destination file; missing parent directories are created
///
/// # Errors
///
/// Returns an error if the file cannot be written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_report(
    items: &[&NewsItem],
    failures: &[BatchError],
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let md = review_to_markdown(items, failures);
    ensure_parent_writable(path).await?;
    fs::write(path, md).await?;
    info!(count = items.len(), "Wrote Markdown report");
    Ok(())
}
