//! Extraction policy: the knobs that differ between newsitem schema revisions.

use serde::{Deserialize, Serialize};

use crate::models::NOT_AVAILABLE;

/// Value used for a text field whose element is missing or blank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum MissingText {
    /// Empty string.
    #[default]
    #[serde(rename = "")]
    Empty,
    /// The `"N/A"` sentinel.
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl MissingText {
    pub fn as_str(self) -> &'static str {
        match self {
            MissingText::Empty => "",
            MissingText::NotAvailable => NOT_AVAILABLE,
        }
    }
}

/// How text fields are defaulted and whether `intro` is folded into `story`.
///
/// The default reproduces the current schema: separate `intro`, empty string
/// for missing text.
///
/// ```yaml
/// extraction:
///   merge_intro_into_story: true
///   missing_text_default: "N/A"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionPolicy {
    /// Prepend the intro to the story, separated by a blank line.
    pub merge_intro_into_story: bool,
    /// Keep the intro in its own field after merging. Ignored unless merging.
    pub retain_intro_after_merge: bool,
    /// Default for text fields that are missing or blank after trimming.
    pub missing_text_default: MissingText,
}

impl ExtractionPolicy {
    /// Policy for the schema revision that merged `intro` into `story`.
    pub fn merged() -> Self {
        Self {
            merge_intro_into_story: true,
            ..Self::default()
        }
    }

    pub fn with_missing_text(mut self, missing: MissingText) -> Self {
        self.missing_text_default = missing;
        self
    }
}
