//! News ingestion and scoring pipeline.
//!
//! One pipeline run turns the taxonomy plus a reporting window into a
//! ranked, deduplicated list of [`ArticleRecord`]s:
//!
//! 1. **Query**: one search per category (an OR-group of the category name
//!    and its keywords) or, when configured, one per keyword
//! 2. **Filter**: parse publication dates, keep the reporting window,
//!    drop promotional titles
//! 3. **Score**: substring relevance over the whole keyword vocabulary
//! 4. **Merge**: dedup by canonical URL, then stable-sort by score
//!
//! Failures degrade, never abort: a failed query skips that category's
//! contribution, an unparseable date drops the single hit. `collect`
//! itself cannot fail — the worst case is an empty result.

use crate::models::{ArticleRecord, SearchHit};
use crate::search::NewsSearch;
use crate::taxonomy::Taxonomy;
use crate::window::ReportingWindow;
use chrono::{DateTime, NaiveDate};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Titles containing any of these terms are promotional or market-noise
/// content (product launches, events, giveaways, price surges), not the
/// business reporting a clipping wants. Matched as raw substrings,
/// case-sensitive.
pub const DEFAULT_EXCLUDED_TITLE_TERMS: &[&str] =
    &["출시", "신제품", "이벤트", "경품", "증정", "급등"];

/// How taxonomy entries are turned into search queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryGranularity {
    /// One OR-group query per category. Fewer external calls; scoring runs
    /// over the full vocabulary either way, so result quality is unchanged.
    #[default]
    PerCategory,
    /// One query per sub-keyword, attributed to its category.
    PerKeyword,
}

/// Which record survives when two queries produce the same URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    /// The record from the later-processed query replaces the earlier one.
    #[default]
    LastWins,
    /// The higher-scoring record survives; on a tie the earlier one stays.
    HighestScore,
}

/// Pipeline tuning knobs. The historical behavioral variants live here as
/// configuration rather than as separate code paths.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub granularity: QueryGranularity,
    pub dedup: DedupPolicy,
    pub excluded_title_terms: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            granularity: QueryGranularity::default(),
            dedup: DedupPolicy::default(),
            excluded_title_terms: DEFAULT_EXCLUDED_TITLE_TERMS
                .iter()
                .map(|term| term.to_string())
                .collect(),
        }
    }
}

/// One search unit: the query string and the category it reports under.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CategoryQuery {
    category: String,
    query: String,
}

/// Run the full pipeline. Queries are issued sequentially in taxonomy
/// order; each one blocks the run until it returns or fails.
#[instrument(level = "info", skip_all)]
pub async fn collect<S: NewsSearch>(
    taxonomy: &Taxonomy,
    window: &ReportingWindow,
    search: &S,
    config: &PipelineConfig,
) -> Vec<ArticleRecord> {
    let keywords = taxonomy.flattened_keywords();
    let queries = build_queries(taxonomy, config.granularity);
    let total = queries.len();

    let batches: Vec<Vec<ArticleRecord>> = stream::iter(queries.into_iter().enumerate())
        .then(|(index, unit)| {
            let keywords = keywords.as_slice();
            async move {
                info!(
                    category = %unit.category,
                    query = %unit.query,
                    progress = %format!("{}/{}", index + 1, total),
                    "Running news search"
                );
                match search.search(&unit.query).await {
                    Ok(hits) => score_hits(&unit.category, hits, window, keywords, config),
                    Err(e) => {
                        warn!(category = %unit.category, error = %e, "Search failed; skipping this query");
                        Vec::new()
                    }
                }
            }
        })
        .collect()
        .await;

    let mut records = dedup_by_url(batches.into_iter().flatten().collect(), config.dedup);
    // Stable sort: equal scores keep their post-dedup relative order.
    records.sort_by(|a, b| b.score.cmp(&a.score));

    info!(count = records.len(), "Collected news records");
    records
}

/// Expand the taxonomy into search units. Categories with no keywords
/// contribute nothing.
fn build_queries(taxonomy: &Taxonomy, granularity: QueryGranularity) -> Vec<CategoryQuery> {
    taxonomy
        .categories
        .iter()
        .filter(|category| !category.keywords.is_empty())
        .flat_map(|category| match granularity {
            QueryGranularity::PerCategory => {
                let query = std::iter::once(&category.name)
                    .chain(category.keywords.iter())
                    .map(|term| format!("\"{term}\""))
                    .join(" OR ");
                vec![CategoryQuery {
                    category: category.name.clone(),
                    query,
                }]
            }
            QueryGranularity::PerKeyword => category
                .keywords
                .iter()
                .map(|keyword| CategoryQuery {
                    category: category.name.clone(),
                    query: keyword.clone(),
                })
                .collect(),
        })
        .collect()
}

/// Filter and score one query's hits into records.
fn score_hits(
    category: &str,
    hits: Vec<SearchHit>,
    window: &ReportingWindow,
    keywords: &[String],
    config: &PipelineConfig,
) -> Vec<ArticleRecord> {
    hits.into_iter()
        .filter_map(|hit| {
            let Some(date) = parse_published_date(&hit.published) else {
                debug!(url = %hit.url, published = %hit.published, "Unparseable publication date; dropping hit");
                return None;
            };
            if !window.contains(date) {
                return None;
            }
            if let Some(term) = excluded_term(&hit.title, &config.excluded_title_terms) {
                debug!(url = %hit.url, term = %term, "Promotional title; dropping hit");
                return None;
            }

            let score = relevance_score(&hit.title, &hit.description, keywords);
            let publisher = hit
                .publisher
                .clone()
                .filter(|name| !name.is_empty())
                .or_else(|| ArticleRecord::publisher_from_url(&hit.url))
                .unwrap_or_default();

            Some(ArticleRecord {
                category: category.to_string(),
                publisher,
                date,
                title: hit.title,
                url: hit.url,
                score,
            })
        })
        .collect()
}

/// Parse the RFC-822-like publication date carried by search hits,
/// e.g. `"Mon, 02 Jan 2024 03:04:05 GMT"`. Only the calendar date is kept.
pub fn parse_published_date(published: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc2822(published)
        .ok()
        .map(|datetime| datetime.date_naive())
}

/// First excluded term contained in the raw title, if any.
fn excluded_term<'t>(title: &str, excluded_terms: &'t [String]) -> Option<&'t str> {
    excluded_terms
        .iter()
        .find(|term| !term.is_empty() && title.contains(term.as_str()))
        .map(|term| term.as_str())
}

/// Relevance of one article against the whole keyword vocabulary.
///
/// Per keyword occurrence (a keyword listed under two categories counts
/// twice): 2 points for a title match, else 1 point for a match in the
/// title+description concatenation, else 0. Matching is substring over
/// whitespace-stripped, case-folded text, so `"식품 매출"` matches
/// `"식품매출"` and `"HMR"` matches `"hmr"`.
pub fn relevance_score(title: &str, description: &str, keywords: &[String]) -> u32 {
    let title_text = normalize(title);
    let full_text = {
        let mut text = title_text.clone();
        text.push_str(&normalize(description));
        text
    };

    keywords
        .iter()
        .map(|keyword| {
            let keyword = normalize(keyword);
            if keyword.is_empty() {
                0
            } else if title_text.contains(&keyword) {
                2
            } else if full_text.contains(&keyword) {
                1
            } else {
                0
            }
        })
        .sum()
}

/// Remove all whitespace and case-fold.
fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Collapse duplicate URLs per the configured policy. The surviving record
/// keeps the list position of the URL's first occurrence.
fn dedup_by_url(records: Vec<ArticleRecord>, policy: DedupPolicy) -> Vec<ArticleRecord> {
    let mut merged: Vec<ArticleRecord> = Vec::with_capacity(records.len());
    let mut index_by_url: HashMap<String, usize> = HashMap::new();

    for record in records {
        match index_by_url.get(&record.url) {
            Some(&index) => {
                let replace = match policy {
                    DedupPolicy::LastWins => true,
                    DedupPolicy::HighestScore => record.score > merged[index].score,
                };
                if replace {
                    merged[index] = record;
                }
            }
            None => {
                index_by_url.insert(record.url.clone(), merged.len());
                merged.push(record);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::Category;
    use chrono::NaiveDate;
    use std::error::Error;

    const IN_WINDOW: &str = "Tue, 02 Jan 2024 03:04:05 GMT";
    const OUT_OF_WINDOW: &str = "Mon, 11 Dec 2023 09:00:00 GMT";

    fn window() -> ReportingWindow {
        // 2023-12-29 (Fri) ..= 2024-01-04 (Thu)
        ReportingWindow::current(NaiveDate::from_ymd_opt(2024, 1, 4).unwrap())
    }

    fn taxonomy(entries: &[(&str, &[&str])]) -> Taxonomy {
        Taxonomy {
            categories: entries
                .iter()
                .map(|(name, keywords)| Category {
                    name: name.to_string(),
                    keywords: keywords.iter().map(|kw| kw.to_string()).collect(),
                })
                .collect(),
        }
    }

    fn hit(title: &str, url: &str, published: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            description: String::new(),
            publisher: Some("테스트일보".to_string()),
            url: url.to_string(),
            published: published.to_string(),
        }
    }

    /// Routes each query to a canned response by substring match on the
    /// query text. Deterministic and restartable.
    struct StubSearch {
        routes: Vec<(&'static str, Result<Vec<SearchHit>, &'static str>)>,
    }

    impl NewsSearch for StubSearch {
        async fn search(&self, query: &str) -> Result<Vec<SearchHit>, Box<dyn Error>> {
            for (needle, response) in &self.routes {
                if query.contains(needle) {
                    return match response {
                        Ok(hits) => Ok(hits.clone()),
                        Err(message) => Err((*message).into()),
                    };
                }
            }
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_title_match_scores_two() {
        let taxonomy = taxonomy(&[("유통", &["이마트"])]);
        let stub = StubSearch {
            routes: vec![(
                "이마트",
                Ok(vec![hit("이마트 가격인상 소식", "https://example.com/a", IN_WINDOW)]),
            )],
        };

        let records =
            collect(&taxonomy, &window(), &stub, &PipelineConfig::default()).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, "유통");
        assert_eq!(records[0].score, 2);
        assert_eq!(records[0].publisher, "테스트일보");
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[tokio::test]
    async fn test_description_match_scores_one() {
        let taxonomy = taxonomy(&[("유통", &["이마트"])]);
        let mut described = hit("유통가 소식 모음", "https://example.com/b", IN_WINDOW);
        described.description = "이마트 관련 동향".to_string();
        let stub = StubSearch {
            routes: vec![("이마트", Ok(vec![described]))],
        };

        let records =
            collect(&taxonomy, &window(), &stub, &PipelineConfig::default()).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].score, 1);
    }

    #[tokio::test]
    async fn test_promotional_title_is_excluded() {
        let taxonomy = taxonomy(&[("유통", &["이마트"])]);
        let stub = StubSearch {
            routes: vec![(
                "이마트",
                Ok(vec![hit("이마트 신제품 출시", "https://example.com/c", IN_WINDOW)]),
            )],
        };

        let records =
            collect(&taxonomy, &window(), &stub, &PipelineConfig::default()).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_window_and_date_filtering() {
        let taxonomy = taxonomy(&[("유통", &["이마트"])]);
        let stub = StubSearch {
            routes: vec![(
                "이마트",
                Ok(vec![
                    hit("이마트 소식 하나", "https://example.com/in", IN_WINDOW),
                    hit("이마트 소식 둘", "https://example.com/out", OUT_OF_WINDOW),
                    hit("이마트 소식 셋", "https://example.com/bad", "어제쯤?"),
                ]),
            )],
        };

        let w = window();
        let records = collect(&taxonomy, &w, &stub, &PipelineConfig::default()).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://example.com/in");
        assert!(records.iter().all(|record| w.contains(record.date)));
    }

    #[tokio::test]
    async fn test_dedup_last_category_wins() {
        let taxonomy = taxonomy(&[("유통", &["이마트"]), ("시장동향", &["물가"])]);
        let shared = "https://example.com/shared";
        let stub = StubSearch {
            routes: vec![
                ("이마트", Ok(vec![hit("이마트 물가 인상", shared, IN_WINDOW)])),
                ("물가", Ok(vec![hit("물가 현황", shared, IN_WINDOW)])),
            ],
        };

        let records =
            collect(&taxonomy, &window(), &stub, &PipelineConfig::default()).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, "시장동향");
        assert_eq!(records[0].title, "물가 현황");
    }

    #[tokio::test]
    async fn test_dedup_highest_score_wins_when_configured() {
        let taxonomy = taxonomy(&[("유통", &["이마트"]), ("시장동향", &["물가"])]);
        let shared = "https://example.com/shared";
        let stub = StubSearch {
            routes: vec![
                // Scores against the full vocabulary: 이마트(2) + 물가(2) = 4.
                ("이마트", Ok(vec![hit("이마트 물가 인상", shared, IN_WINDOW)])),
                // 물가(2) only.
                ("물가", Ok(vec![hit("물가 현황", shared, IN_WINDOW)])),
            ],
        };

        let config = PipelineConfig {
            dedup: DedupPolicy::HighestScore,
            ..PipelineConfig::default()
        };
        let records = collect(&taxonomy, &window(), &stub, &config).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, "유통");
        assert_eq!(records[0].score, 4);
    }

    #[tokio::test]
    async fn test_failed_query_skips_only_that_category() {
        let taxonomy = taxonomy(&[("유통", &["이마트"]), ("시장동향", &["물가"])]);
        let stub = StubSearch {
            routes: vec![
                ("이마트", Err("connection reset")),
                ("물가", Ok(vec![hit("물가 현황", "https://example.com/d", IN_WINDOW)])),
            ],
        };

        let records =
            collect(&taxonomy, &window(), &stub, &PipelineConfig::default()).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, "시장동향");
    }

    #[tokio::test]
    async fn test_empty_taxonomy_yields_empty_result() {
        let empty = taxonomy(&[]);
        let all_empty = taxonomy(&[("유통", &[]), ("시장동향", &[])]);
        let stub = StubSearch { routes: vec![] };

        assert!(collect(&empty, &window(), &stub, &PipelineConfig::default()).await.is_empty());
        assert!(
            collect(&all_empty, &window(), &stub, &PipelineConfig::default()).await.is_empty()
        );
    }

    #[tokio::test]
    async fn test_collect_is_deterministic() {
        let taxonomy = taxonomy(&[("유통", &["이마트"]), ("시장동향", &["물가"])]);
        let stub = StubSearch {
            routes: vec![
                ("이마트", Ok(vec![hit("이마트 물가 인상", "https://example.com/a", IN_WINDOW)])),
                ("물가", Ok(vec![hit("물가 현황", "https://example.com/b", IN_WINDOW)])),
            ],
        };
        let config = PipelineConfig::default();

        let first = collect(&taxonomy, &window(), &stub, &config).await;
        let second = collect(&taxonomy, &window(), &stub, &config).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_results_sorted_by_score_descending_and_stable() {
        let taxonomy = taxonomy(&[("유통", &["이마트", "홈플러스"])]);
        let stub = StubSearch {
            routes: vec![(
                "이마트",
                Ok(vec![
                    hit("유통가 단신", "https://example.com/1", IN_WINDOW),
                    hit("이마트 홈플러스 비교", "https://example.com/2", IN_WINDOW),
                    hit("업계 단신 모음", "https://example.com/3", IN_WINDOW),
                ]),
            )],
        };

        let records =
            collect(&taxonomy, &window(), &stub, &PipelineConfig::default()).await;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].url, "https://example.com/2");
        // Zero-score ties keep their pre-sort relative order.
        assert_eq!(records[1].url, "https://example.com/1");
        assert_eq!(records[2].url, "https://example.com/3");
        assert!(records.windows(2).all(|pair| pair[0].score >= pair[1].score));
    }

    #[test]
    fn test_relevance_score_normalizes_whitespace_and_case() {
        let keywords = vec!["식품 매출".to_string(), "HMR".to_string()];
        assert_eq!(relevance_score("식품매출 증가", "", &keywords), 2);
        assert_eq!(relevance_score("hmr 시장 확대", "", &keywords), 2);
        assert_eq!(relevance_score("유통 단신", "식품 매출 요약", &keywords), 1);
    }

    #[test]
    fn test_relevance_score_counts_duplicate_keywords_per_occurrence() {
        let keywords = vec!["햄".to_string(), "햄".to_string()];
        assert_eq!(relevance_score("햄 가격 동향", "", &keywords), 4);
    }

    #[test]
    fn test_relevance_score_ignores_empty_keywords() {
        let keywords = vec![String::new()];
        assert_eq!(relevance_score("아무 제목", "아무 내용", &keywords), 0);
    }

    #[test]
    fn test_adding_matching_keyword_never_lowers_score() {
        let keywords: Vec<String> =
            vec!["이마트".into(), "물가".into(), "가격인상".into()];
        let base = relevance_score("이마트 소식", "물가 참고", &keywords);
        let extended = relevance_score("이마트 가격인상 소식", "물가 참고", &keywords);
        assert!(extended >= base);
    }

    #[test]
    fn test_parse_published_date() {
        assert_eq!(
            parse_published_date("Mon, 02 Jan 2024 03:04:05 GMT"),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        assert_eq!(parse_published_date("2024-01-02"), None);
        assert_eq!(parse_published_date(""), None);
    }

    #[test]
    fn test_build_queries_per_category_groups_keywords() {
        let taxonomy = taxonomy(&[("유통", &["이마트", "홈플러스"]), ("빈그룹", &[])]);
        let queries = build_queries(&taxonomy, QueryGranularity::PerCategory);

        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].category, "유통");
        assert_eq!(queries[0].query, "\"유통\" OR \"이마트\" OR \"홈플러스\"");
    }

    #[test]
    fn test_build_queries_per_keyword_expands_each() {
        let taxonomy = taxonomy(&[("유통", &["이마트", "홈플러스"])]);
        let queries = build_queries(&taxonomy, QueryGranularity::PerKeyword);

        assert_eq!(queries.len(), 2);
        assert!(queries.iter().all(|unit| unit.category == "유통"));
        assert_eq!(queries[0].query, "이마트");
        assert_eq!(queries[1].query, "홈플러스");
    }

    #[test]
    fn test_dedup_keeps_first_position() {
        let make = |category: &str, url: &str, score: u32| ArticleRecord {
            category: category.to_string(),
            publisher: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            title: String::new(),
            url: url.to_string(),
            score,
        };
        let records = vec![
            make("유통", "https://example.com/x", 1),
            make("유통", "https://example.com/y", 1),
            make("시장동향", "https://example.com/x", 3),
        ];

        let merged = dedup_by_url(records, DedupPolicy::LastWins);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].url, "https://example.com/x");
        assert_eq!(merged[0].category, "시장동향");
        assert_eq!(merged[0].score, 3);
        assert_eq!(merged[1].url, "https://example.com/y");
    }
}
