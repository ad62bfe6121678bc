//! Google News RSS search backend.
//!
//! Google News exposes keyword search as an RSS 2.0 feed at
//! `https://news.google.com/rss/search?q=<query>&hl=<lang>&gl=<country>&ceid=<country>:<lang>`.
//! Each `<item>` carries a title, a redirect link, an RFC-822 `pubDate`,
//! an HTML description, and a `<source>` element naming the publisher.
//!
//! # Title Format
//!
//! Google News appends the publisher to the headline as
//! `"Article Title - Publisher"`. The suffix is stripped from the title and
//! used as the publisher fallback when the `<source>` element is missing.

use crate::models::SearchHit;
use crate::search::NewsSearch;
use crate::utils::{strip_html, truncate_for_log};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const GOOGLE_NEWS_RSS_URL: &str = "https://news.google.com/rss/search";

/// Client for the Google News RSS search endpoint.
#[derive(Debug, Clone)]
pub struct GoogleNewsClient {
    client: reqwest::Client,
    base_url: String,
    language: String,
    country: String,
    max_results: usize,
}

impl GoogleNewsClient {
    /// Create a client with language/region hints, e.g. `("ko", "KR")`,
    /// keeping at most `max_results` hits per query.
    pub fn new(language: &str, country: &str, max_results: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("Mozilla/5.0 (compatible; NewsClipper/0.1)")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        GoogleNewsClient {
            client,
            base_url: GOOGLE_NEWS_RSS_URL.to_string(),
            language: language.to_string(),
            country: country.to_string(),
            max_results,
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}?q={}&hl={}&gl={}&ceid={}:{}",
            self.base_url,
            urlencoding::encode(query),
            self.language,
            self.country,
            self.country,
            self.language
        )
    }
}

impl NewsSearch for GoogleNewsClient {
    #[instrument(level = "info", skip_all, fields(query = %query))]
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, Box<dyn Error>> {
        let url = self.search_url(query);
        debug!(%url, "Fetching Google News RSS");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(format!("Google News returned status {}", response.status()).into());
        }
        let body = response.text().await?;

        let mut hits = parse_rss(&body).map_err(|e| {
            warn!(
                error = %e,
                body_preview = %truncate_for_log(&body, 200),
                "Failed to parse Google News RSS"
            );
            e
        })?;
        hits.truncate(self.max_results);

        info!(count = hits.len(), "Google News search complete");
        Ok(hits)
    }
}

/// Parse a Google News RSS 2.0 document into search hits.
///
/// Items missing a title or link are skipped; everything else is kept and
/// left for the pipeline to filter.
pub fn parse_rss(xml: &str) -> Result<Vec<SearchHit>, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut hits = Vec::new();
    let mut in_item = false;
    let mut current_tag = String::new();
    let mut title = String::new();
    let mut link = String::new();
    let mut description = String::new();
    let mut published = String::new();
    let mut source = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "item" {
                    in_item = true;
                    title.clear();
                    link.clear();
                    description.clear();
                    published.clear();
                    source.clear();
                }
                current_tag = name;
            }
            Ok(Event::End(e)) => {
                let tag = e.name();
                let name = String::from_utf8_lossy(tag.as_ref());
                if name == "item" && in_item {
                    in_item = false;
                    if !title.is_empty() && !link.is_empty() {
                        let (clean_title, suffix_publisher) = split_source_suffix(&title);
                        let publisher = if source.is_empty() {
                            suffix_publisher
                        } else {
                            Some(source.clone())
                        };
                        hits.push(SearchHit {
                            title: clean_title,
                            description: strip_html(&description),
                            publisher,
                            url: link.clone(),
                            published: published.clone(),
                        });
                    }
                }
                current_tag.clear();
            }
            Ok(Event::Text(e)) => {
                if in_item {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    match current_tag.as_str() {
                        "title" => title = text,
                        "link" => link = text,
                        "description" => description = text,
                        "pubDate" => published = text,
                        "source" => source = text,
                        _ => {}
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if in_item {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    match current_tag.as_str() {
                        "title" => title = text,
                        "description" => description = text,
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Box::new(e)),
            _ => {}
        }
    }

    Ok(hits)
}

/// Split the `"Article Title - Publisher"` form Google News uses into the
/// bare title and the publisher suffix, when one is present.
fn split_source_suffix(title: &str) -> (String, Option<String>) {
    match title.rfind(" - ") {
        Some(pos) if pos > 0 && pos + 3 < title.len() => {
            let clean = title[..pos].trim().to_string();
            let publisher = title[pos + 3..].trim().to_string();
            (clean, Some(publisher))
        }
        _ => (title.to_string(), None),
    }
}
