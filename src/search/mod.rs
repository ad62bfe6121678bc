//! News-search backends.
//!
//! The pipeline is written against the [`NewsSearch`] trait so the external
//! search capability stays swappable: production uses [`google::GoogleNewsClient`],
//! tests use deterministic stubs.
//!
//! A backend's contract is small:
//! - `search(query)` returns the backend's raw hits for one free-text query
//! - hits carry the backend's own publication-date string; the pipeline
//!   parses and filters dates so a backend never drops its own results
//! - errors are returned to the caller, which absorbs them per query

pub mod google;

use crate::models::SearchHit;
use std::error::Error;

/// Trait for an external news-search capability.
pub trait NewsSearch {
    /// Run one free-text query and return the raw hits, most relevant first
    /// as ranked by the backend.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, Box<dyn Error>>;
}
