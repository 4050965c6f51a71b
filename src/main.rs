//! # Newsitem Reviewer
//!
//! Loads a batch of newsitem XML files, extracts each into a structured
//! record, lists them (optionally filtered by a search query), optionally
//! asks an LLM for a summary of each, and exports the result.
//!
//! ## Usage
//!
//! ```sh
//! newsitem_reviewer -s budget --summarize -j ./review.json -m ./review.md articles/*.xml
//! ```
//!
//! ## Pipeline
//!
//! 1. **Loading**: Read every file concurrently, keeping selection order
//! 2. **Extraction**: Extract each file; failures are reported per file
//! 3. **Review**: Collect successes into a session and apply the search filter
//! 4. **Summaries**: Optionally summarize the listed items (bounded concurrency)
//! 5. **Output**: Print the listing, write JSON and Markdown exports

use clap::Parser;
use std::error::Error;
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use uuid::Uuid;

use newsitem_reviewer::api::summarize_session;
use newsitem_reviewer::cli::Cli;
use newsitem_reviewer::config::{AppConfig, load_config};
use newsitem_reviewer::extractor::{Extractor, extract_batch, load_sources};
use newsitem_reviewer::models::NewsItem;
use newsitem_reviewer::outputs::{json, markdown};
use newsitem_reviewer::session::Session;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    info!("newsitem_reviewer starting up");

    let args = Cli::parse();
    debug!(files = args.files.len(), search = ?args.search, summarize = args.summarize, "Parsed CLI arguments");

    // ---- Configuration ----
    let mut config = match &args.config {
        Some(path) => load_config(path).await?,
        None => AppConfig::default(),
    };
    if args.merge_intro {
        config.extraction.merge_intro_into_story = true;
    }
    if let Some(missing) = args.missing_text {
        config.extraction.missing_text_default = missing.into();
    }
    if args.api_key.is_some() {
        config.summarizer.api_key = args.api_key.clone();
    }

    // ---- Load and extract ----
    let sources = load_sources(&args.files).await;
    let extractor = Extractor::new(config.extraction.clone());
    let outcome = extract_batch(&extractor, sources);

    for failure in &outcome.failures {
        eprintln!("{failure}");
    }
    if outcome.items.is_empty() {
        error!(failed = outcome.failures.len(), "No file could be extracted");
        return Err("no newsitem could be extracted from the given files".into());
    }

    let mut session = Session::new();
    session.add_batch(outcome.items);

    let listed: Vec<Uuid> = match &args.search {
        Some(query) => session.search(query).iter().map(|item| item.id).collect(),
        None => session.items().iter().map(|item| item.id).collect(),
    };
    info!(listed = listed.len(), total = session.len(), "Items selected for review");

    // ---- Summaries ----
    if args.summarize {
        summarize_session(&mut session, &listed, &config.summarizer).await;
    }

    // ---- Listing ----
    for item in listed.iter().filter_map(|id| session.get(*id)) {
        println!("{}\t{}\t{}", item.filename, item.headline, item.byline);
        if let Some(summary) = &item.ai_summary {
            println!("\t{summary}");
        }
    }

    // ---- Exports ----
    let items: Vec<&NewsItem> = listed.iter().filter_map(|id| session.get(*id)).collect();

    if let Some(path) = &args.json_output {
        if let Err(e) = json::write_export(items.clone(), path).await {
            error!(path = %path.display(), error = %e, "Failed to write JSON export");
        }
    }

    if let Some(path) = &args.markdown_output {
        if let Err(e) = markdown::write_report(&items, &outcome.failures, path).await {
            error!(path = %path.display(), error = %e, "Failed to write Markdown report");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        extracted = session.len(),
        failed = outcome.failures.len(),
        "Execution complete"
    );
    Ok(())
}
