//! # Newsitem Reviewer
//!
//! Extracts journalistic "newsitem" XML documents into flat, well-typed
//! records and supports reviewing them: searching, editing the story, and
//! attaching an AI-generated summary.
//!
//! ## Features
//!
//! - Fixed mapping from the newsitem schema to [`models::NewsItem`], with
//!   defaults for every missing field
//! - Extraction policy covering schema revisions (intro merged into story,
//!   `""` or `"N/A"` for missing text)
//! - Collect-all batch extraction: one bad file never stops the others
//! - In-memory review [`session::Session`] with search and whole-record updates
//! - Summaries from an OpenAI-compatible endpoint, with retries and a fixed
//!   placeholder on failure
//! - JSON export and Markdown report
//!
//! ## Example
//!
//! ```
//! use newsitem_reviewer::extractor::extract;
//!
//! let item = extract(
//!     "<newsitem><headline>A</headline><story>B</story></newsitem>",
//!     "a.xml",
//! )
//! .unwrap();
//! assert_eq!(item.headline, "A");
//! assert_eq!(item.byline, "Anonymous");
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod extractor;
pub mod models;
pub mod outputs;
pub mod session;
pub mod utils;
