//! Manual article selection, keyed by canonical URL.
//!
//! The presentation layer owns one [`Selection`] per collected result list
//! and clears it whenever a new pipeline run completes. Keying by URL keeps
//! the selection stable across re-renders — it survives anything short of
//! the record list itself being replaced.

use crate::models::ArticleRecord;
use std::collections::HashSet;

/// The set of article URLs the operator has flagged for export.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    urls: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    /// Flag a URL. Returns `true` if it was newly added.
    pub fn select(&mut self, url: &str) -> bool {
        self.urls.insert(url.to_string())
    }

    /// Unflag a URL. Returns `true` if it was present.
    pub fn deselect(&mut self, url: &str) -> bool {
        self.urls.remove(url)
    }

    /// Flip a URL's flag, returning its new state.
    pub fn toggle(&mut self, url: &str) -> bool {
        if self.urls.remove(url) {
            false
        } else {
            self.urls.insert(url.to_string());
            true
        }
    }

    /// Drop every flag. Used when a new result list replaces the old one.
    pub fn clear(&mut self) {
        self.urls.clear();
    }

    pub fn is_selected(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Materialize the selected subset of `records`, preserving the result
    /// list's order. Flags with no matching record are ignored.
    pub fn records(&self, records: &[ArticleRecord]) -> Vec<ArticleRecord> {
        records
            .iter()
            .filter(|record| self.urls.contains(&record.url))
            .cloned()
            .collect()
    }
}
