//! Data models for extracted newsitem documents.
//!
//! This module defines the records produced by the extractor and held by the
//! review session:
//! - [`NewsItem`]: One article extracted from one uploaded XML file
//! - [`NewsItemMetadata`]: Provenance snapshot (language, source, dates, positions)
//! - [`Source`], [`LogicalPosition`]: Attribute groups nested in the metadata
//!
//! Field names serialize in camelCase so exported JSON keeps the shape the
//! review front end has always used (`mediaType`, `docDate`, `aiSummary`, ...).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel used for attribute-backed fields that were not present in the document.
pub const NOT_AVAILABLE: &str = "N/A";

/// Byline used when neither the `name` attribute nor the element text is present.
pub const ANONYMOUS_BYLINE: &str = "Anonymous";

/// Publisher of the article, read from the `name`/`country` attributes of `<source>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Source {
    pub name: String,
    pub country: String,
}

/// Section-level locator, read from `<logical_position value=".." type="..">`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogicalPosition {
    pub value: String,
    /// Serialized as `type`, which is a reserved word in Rust.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Immutable snapshot of where a document came from.
///
/// Every field is always populated. Text-backed fields (`language`,
/// `media_type`) follow the extraction policy's missing-text default; all
/// attribute-backed fields fall back to [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItemMetadata {
    /// Language classifier from `<language>`.
    pub language: String,
    /// Media classifier from `<mediatype>`.
    pub media_type: String,
    /// Publisher name and country.
    pub source: Source,
    /// Date string as found in `<docdate local="..">`.
    pub doc_date: String,
    /// Page locator from `<physical_position page="..">`.
    pub physical_position: String,
    /// Section locator.
    pub logical_position: LogicalPosition,
}

/// One article extracted from one uploaded file.
///
/// The extractor creates a `NewsItem` exactly once per file and never touches
/// it again. Edits (story text, AI summary) are applied by the session as
/// whole-record replacement keyed by [`NewsItem::id`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    /// Process-unique identifier generated at extraction time.
    pub id: Uuid,
    /// Name of the file this record was extracted from.
    pub filename: String,
    pub headline: String,
    pub subheadline: String,
    pub intro: String,
    /// Body text, the field a reviewer edits. May end with an
    /// `[Image: <caption>]` annotation.
    pub story: String,
    /// Author attribution, `"Anonymous"` when the document names nobody.
    pub byline: String,
    pub metadata: NewsItemMetadata,
    /// Summary attached by the summarizer; never set by the extractor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
}

impl NewsItem {
    /// Copy of this record with the story replaced.
    pub fn with_story(&self, story: impl Into<String>) -> Self {
        Self {
            story: story.into(),
            ..self.clone()
        }
    }

    /// Copy of this record with a summary attached.
    pub fn with_summary(&self, summary: impl Into<String>) -> Self {
        Self {
            ai_summary: Some(summary.into()),
            ..self.clone()
        }
    }

    /// Case-insensitive substring match over the headline and filename.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.headline.to_lowercase().contains(&needle)
            || self.filename.to_lowercase().contains(&needle)
    }

    /// Number of characters in the story, as shown next to the editor.
    pub fn story_chars(&self) -> usize {
        self.story.chars().count()
    }
}

#[cfg(test)]
pub(crate) fn sample_item(filename: &str, headline: &str) -> NewsItem {
    NewsItem {
        id: Uuid::new_v4(),
        filename: filename.to_string(),
        headline: headline.to_string(),
        subheadline: String::new(),
        intro: String::new(),
        story: "Body".to_string(),
        byline: ANONYMOUS_BYLINE.to_string(),
        metadata: NewsItemMetadata {
            language: "en".to_string(),
            media_type: "print".to_string(),
            source: Source {
                name: NOT_AVAILABLE.to_string(),
                country: NOT_AVAILABLE.to_string(),
            },
            doc_date: NOT_AVAILABLE.to_string(),
            physical_position: NOT_AVAILABLE.to_string(),
            logical_position: LogicalPosition {
                value: NOT_AVAILABLE.to_string(),
                kind: NOT_AVAILABLE.to_string(),
            },
        },
        ai_summary: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_item_serializes_camel_case() {
        let item = sample_item("a.xml", "Headline");
        let json = serde_json::to_string(&item).unwrap();

        assert!(json.contains("\"mediaType\":\"print\""));
        assert!(json.contains("\"docDate\":\"N/A\""));
        assert!(json.contains("\"physicalPosition\""));
        assert!(json.contains("\"logicalPosition\":{\"value\":\"N/A\",\"type\":\"N/A\"}"));
        assert!(!json.contains("aiSummary"));
    }

    #[test]
    fn test_news_item_deserialization_with_summary() {
        let item = sample_item("a.xml", "Headline").with_summary("Short.");
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"aiSummary\":\"Short.\""));

        let back: NewsItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ai_summary.as_deref(), Some("Short."));
        assert_eq!(back.id, item.id);
    }

    #[test]
    fn test_with_story_keeps_identity() {
        let item = sample_item("a.xml", "Headline");
        let edited = item.with_story("Edited body");

        assert_eq!(edited.id, item.id);
        assert_eq!(edited.story, "Edited body");
        assert_eq!(item.story, "Body");
    }

    #[test]
    fn test_matches_headline_and_filename() {
        let item = sample_item("Budget_2024.xml", "Council Approves Plan");

        assert!(item.matches("council"));
        assert!(item.matches("BUDGET"));
        assert!(item.matches(""));
        assert!(!item.matches("weather"));
    }

    #[test]
    fn test_story_chars_counts_characters() {
        let item = sample_item("a.xml", "H").with_story("Zürich");
        assert_eq!(item.story_chars(), 6);
    }
}
