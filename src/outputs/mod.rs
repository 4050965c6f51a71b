//! Export of a review session.
//!
//! # Submodules
//!
//! - [`json`]: Writes the reviewed items to a JSON file
//! - [`markdown`]: Renders the reviewed items and failed files as a Markdown report

pub mod json;
pub mod markdown;
