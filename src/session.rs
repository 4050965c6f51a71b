//! In-memory review session.
//!
//! The session owns the ordered collection of extracted [`NewsItem`]s for one
//! review run. Items are appended in upload order, replaced whole by `id`
//! when edited, and dropped all at once by [`Session::clear`]. Nothing here
//! is global: callers own a `Session` and pass it by reference.

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::NewsItem;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("No news item with id {0}")]
    UnknownItem(Uuid),
}

/// Ordered collection of reviewed items plus the current selection.
#[derive(Debug, Default)]
pub struct Session {
    items: Vec<NewsItem>,
    selected: Option<Uuid>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch in order. The first new item becomes selected when
    /// nothing is selected yet.
    pub fn add_batch(&mut self, items: impl IntoIterator<Item = NewsItem>) {
        let before = self.items.len();
        self.items.extend(items);
        if self.selected.is_none() {
            self.selected = self.items.get(before).map(|item| item.id);
        }
        info!(
            added = self.items.len() - before,
            total = self.items.len(),
            "Added items to session"
        );
    }

    pub fn items(&self) -> &[NewsItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&NewsItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Select an item by id. Returns `false` if no such item exists.
    pub fn select(&mut self, id: Uuid) -> bool {
        if self.get(id).is_some() {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<&NewsItem> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Replace the item with the same `id` as `updated`.
    pub fn replace(&mut self, updated: NewsItem) -> Result<(), SessionError> {
        let slot = self
            .items
            .iter_mut()
            .find(|item| item.id == updated.id)
            .ok_or(SessionError::UnknownItem(updated.id))?;
        debug!(id = %updated.id, filename = %updated.filename, "Replacing item");
        *slot = updated;
        Ok(())
    }

    /// Save an edited story.
    pub fn update_story(&mut self, id: Uuid, story: impl Into<String>) -> Result<(), SessionError> {
        let updated = self
            .get(id)
            .ok_or(SessionError::UnknownItem(id))?
            .with_story(story);
        self.replace(updated)
    }

    /// Attach a summary produced from `story`, saving that story too.
    pub fn attach_summary(
        &mut self,
        id: Uuid,
        story: impl Into<String>,
        summary: impl Into<String>,
    ) -> Result<(), SessionError> {
        let updated = self
            .get(id)
            .ok_or(SessionError::UnknownItem(id))?
            .with_story(story)
            .with_summary(summary);
        self.replace(updated)
    }

    /// Items whose headline or filename contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&NewsItem> {
        self.items.iter().filter(|item| item.matches(query)).collect()
    }

    /// Drop every item and the selection.
    pub fn clear(&mut self) {
        info!(dropped = self.items.len(), "Clearing session");
        self.items.clear();
        self.selected = None;
    }
}
