//! Data models for search hits and collected article records.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SearchHit`]: A raw hit as returned by the external news-search capability
//! - [`ArticleRecord`]: A scored, window-filtered article produced by the pipeline
//! - [`ClippingReport`]: The full output of one pipeline run, ready for serialization
//!
//! `SearchHit`s are ephemeral inputs; `ArticleRecord`s are recreated fresh on
//! every run, keyed by canonical URL, and never mutated after the run completes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A raw hit as returned by a news-search backend.
///
/// The publication date is kept as the backend's original string
/// (RFC-822-like, e.g. `"Mon, 02 Jan 2024 03:04:05 GMT"`); parsing and
/// window filtering happen in the pipeline, so a backend never has to
/// reject its own results.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The article headline.
    pub title: String,
    /// Snippet or summary text; may be empty.
    pub description: String,
    /// Publisher display name, if the backend reported one.
    pub publisher: Option<String>,
    /// Canonical article URL. This is the dedup key downstream.
    pub url: String,
    /// Raw publication-date string from the backend.
    pub published: String,
}

/// A scored article surviving the pipeline's filters.
///
/// Records have no identity beyond their URL: across one collected set at
/// most one record per URL survives the merge step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// The taxonomy category whose query produced this record.
    pub category: String,
    /// Publisher display name; falls back to the URL host when the backend
    /// reported none.
    pub publisher: String,
    /// Publication date (calendar date, no time-of-day semantics).
    pub date: NaiveDate,
    /// The article headline.
    pub title: String,
    /// Canonical article URL.
    pub url: String,
    /// Relevance score over the whole keyword vocabulary.
    pub score: u32,
}

impl ArticleRecord {
    /// Extract a publisher display name from an article URL's host,
    /// e.g. `"https://news.example.co.kr/a/1"` -> `"news.example.co.kr"`.
    pub fn publisher_from_url(url: &str) -> Option<String> {
        url::Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(|host| host.to_string()))
    }
}

/// The complete result of one pipeline run.
///
/// Serialized as-is to the JSON report; the spreadsheet export consumes
/// only the record list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClippingReport {
    /// First day of the reporting window (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the reporting window (inclusive).
    pub end_date: NaiveDate,
    /// Ranked, deduplicated records, highest relevance first.
    pub articles: Vec<ArticleRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str) -> ArticleRecord {
        ArticleRecord {
            category: "유통".to_string(),
            publisher: "테스트일보".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            title: "이마트 가격인상 소식".to_string(),
            url: url.to_string(),
            score: 2,
        }
    }

    #[test]
    fn test_publisher_from_url() {
        assert_eq!(
            ArticleRecord::publisher_from_url("https://news.example.co.kr/a/1"),
            Some("news.example.co.kr".to_string())
        );
        assert_eq!(ArticleRecord::publisher_from_url("not a url"), None);
    }

    #[test]
    fn test_record_serialization_uses_iso_dates() {
        let json = serde_json::to_string(&record("https://example.com/a")).unwrap();
        assert!(json.contains("2024-01-02"));
        assert!(json.contains("유통"));
    }

    #[test]
    fn test_report_round_trips() {
        let report = ClippingReport {
            start_date: NaiveDate::from_ymd_opt(2023, 12, 29).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
            articles: vec![record("https://example.com/a")],
        };

        let json = serde_json::to_string(&report).unwrap();
        let parsed: ClippingReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.articles, report.articles);
        assert_eq!(parsed.end_date, report.end_date);
    }
}
