//! Newsitem XML extraction.
//!
//! Turns the text of one uploaded file into a [`NewsItem`] or an
//! [`ExtractError`] naming the file. Extraction is pure: no I/O, no shared
//! state, safe to run on any number of files in any order.
//!
//! # Field mapping
//!
//! | Field | Source | Missing |
//! |-------|--------|---------|
//! | `language`, `mediaType` | text of `<language>`, `<mediatype>` | policy default |
//! | `headline`, `subheadline`, `intro`, `story` | text of like-named elements | policy default |
//! | `source.name`, `source.country` | `<source name country>` | `"N/A"` |
//! | `docDate` | `<docdate local>` | `"N/A"` |
//! | `physicalPosition` | `<physical_position page>` | `"N/A"` |
//! | `logicalPosition` | `<logical_position value type>` | `"N/A"` |
//! | `byline` | `<byline name>`, else its text | `"Anonymous"` |
//!
//! Every lookup is a document-wide first match, not a walk of the
//! `<newsitem>` subtree. When `<image>` has text, the story gets a trailing
//! `"\n\n[Image: <caption>]"` annotation.

pub mod batch;
pub mod document;
pub mod policy;

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    ANONYMOUS_BYLINE, LogicalPosition, NOT_AVAILABLE, NewsItem, NewsItemMetadata, Source,
};

pub use batch::{BatchError, BatchOutcome, SourceFile, extract_batch, load_sources};
pub use document::{Document, DocumentError, Element};
pub use policy::{ExtractionPolicy, MissingText};

/// Tag name of the element that marks a document as a newsitem.
pub const ROOT_TAG: &str = "newsitem";

/// Why a single file could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The text is not well-formed XML.
    #[error("Invalid XML structure in {filename}")]
    InvalidXmlStructure {
        filename: String,
        #[source]
        reason: DocumentError,
    },

    /// Well-formed XML without a `<newsitem>` element.
    #[error("No <newsitem> tag found in {filename}")]
    MissingRootElement { filename: String },
}

impl ExtractError {
    /// File the failure belongs to.
    pub fn filename(&self) -> &str {
        match self {
            ExtractError::InvalidXmlStructure { filename, .. }
            | ExtractError::MissingRootElement { filename } => filename,
        }
    }
}

/// Extracts [`NewsItem`]s under a fixed [`ExtractionPolicy`].
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    policy: ExtractionPolicy,
}

impl Extractor {
    pub fn new(policy: ExtractionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ExtractionPolicy {
        &self.policy
    }

    /// Extract one document.
    ///
    /// # Arguments
    ///
    /// * `xml` - Full text of the newsitem document
    /// * `filename` - Name recorded on the item and used in error messages
    ///
    /// # Returns
    ///
    /// A [`NewsItem`] with a fresh id and every missing field defaulted
    /// according to the policy.
    ///
    /// # Errors
    ///
    /// [`ExtractError::InvalidXmlStructure`] when the document is not
    /// well-formed, [`ExtractError::MissingRootElement`] when it contains no
    /// `<newsitem>` element.
    pub fn extract(&self, xml: &str, filename: &str) -> Result<NewsItem, ExtractError> {
        let doc = Document::parse(xml).map_err(|reason| ExtractError::InvalidXmlStructure {
            filename: filename.to_string(),
            reason,
        })?;

        if doc.first(ROOT_TAG).is_none() {
            return Err(ExtractError::MissingRootElement {
                filename: filename.to_string(),
            });
        }

        let missing = self.policy.missing_text_default;
        let text_or_default = |tag: &str| text(&doc, tag).unwrap_or_else(|| missing.as_str().to_string());

        let metadata = NewsItemMetadata {
            language: text_or_default("language"),
            media_type: text_or_default("mediatype"),
            source: Source {
                name: attr(&doc, "source", "name"),
                country: attr(&doc, "source", "country"),
            },
            doc_date: attr(&doc, "docdate", "local"),
            physical_position: attr(&doc, "physical_position", "page"),
            logical_position: LogicalPosition {
                value: attr(&doc, "logical_position", "value"),
                kind: attr(&doc, "logical_position", "type"),
            },
        };

        let intro = text(&doc, "intro");
        let story = text(&doc, "story");
        let (intro, story) = if self.policy.merge_intro_into_story {
            let merged = match (&intro, &story) {
                (Some(intro), Some(story)) => Some(format!("{intro}\n\n{story}")),
                (Some(only), None) | (None, Some(only)) => Some(only.clone()),
                (None, None) => None,
            };
            let intro = if self.policy.retain_intro_after_merge {
                intro
            } else {
                None
            };
            (intro, merged)
        } else {
            (intro, story)
        };

        let mut story = story.unwrap_or_else(|| missing.as_str().to_string());
        if let Some(caption) = text(&doc, "image") {
            story = format!("{story}\n\n[Image: {caption}]");
        }

        let item = NewsItem {
            id: Uuid::new_v4(),
            filename: filename.to_string(),
            headline: text_or_default("headline"),
            subheadline: text_or_default("subheadline"),
            intro: intro.unwrap_or_else(|| missing.as_str().to_string()),
            story,
            byline: byline(&doc),
            metadata,
            ai_summary: None,
        };

        debug!(
            %filename,
            id = %item.id,
            elements = doc.len(),
            story_chars = item.story_chars(),
            "Extracted newsitem"
        );
        Ok(item)
    }
}

/// Extract one document with the default policy.
///
/// # Arguments
///
/// * `xml` - Full text of the newsitem document
/// * `filename` - Name recorded on the item and used in error messages
///
/// # Returns
///
/// The extracted [`NewsItem`], or the [`ExtractError`] that stopped it.
pub fn extract(xml: &str, filename: &str) -> Result<NewsItem, ExtractError> {
    Extractor::default().extract(xml, filename)
}

/// Trimmed text of the first `tag`, `None` when missing or blank.
fn text(doc: &Document, tag: &str) -> Option<String> {
    doc.first(tag)
        .map(|e| e.text().trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Attribute of the first `tag`, `"N/A"` when the element or attribute is missing or empty.
fn attr(doc: &Document, tag: &str, name: &str) -> String {
    doc.first(tag)
        .and_then(|e| e.attr(name))
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

/// `name` attribute, else trimmed text, else `"Anonymous"`.
fn byline(doc: &Document) -> String {
    let Some(element) = doc.first("byline") else {
        return ANONYMOUS_BYLINE.to_string();
    };
    element
        .attr("name")
        .filter(|name| !name.is_empty())
        .or_else(|| Some(element.text().trim()).filter(|t| !t.is_empty()))
        .unwrap_or(ANONYMOUS_BYLINE)
        .to_string()
}
