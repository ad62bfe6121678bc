//! # News Clipper
//!
//! A weekly news-clipping pipeline that searches Google News for a
//! configured business-keyword taxonomy, filters hits to the current
//! Friday-to-Thursday reporting window, scores them for relevance,
//! deduplicates by URL, and exports the ranked list as a JSON report and
//! an XLSX spreadsheet with hyperlinked titles.
//!
//! ## Usage
//!
//! ```sh
//! news_clipper -t taxonomy.yaml -o ./clippings
//! news_clipper add-keyword 시장동향 "소비 트렌드"
//! ```
//!
//! ## Architecture
//!
//! One run follows a pipeline architecture:
//! 1. **Load**: read the taxonomy (built-in default when the file is absent)
//! 2. **Window**: compute the Friday-to-Thursday reporting window
//! 3. **Collect**: query Google News per category, filter, score, dedup
//! 4. **Output**: write the JSON report and the XLSX export
//!
//! Per-category search failures are logged and skipped; a run only fails
//! on unwritable output or an unsaveable taxonomy.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod models;
mod outputs;
mod pipeline;
mod search;
mod selection;
mod taxonomy;
mod utils;
mod window;

use cli::{Cli, Command};
use models::ClippingReport;
use outputs::{json, xlsx};
use pipeline::{DedupPolicy, PipelineConfig, QueryGranularity};
use search::google::GoogleNewsClient;
use selection::Selection;
use taxonomy::TaxonomyStore;
use window::ReportingWindow;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args.taxonomy, ?args.output_dir, "Parsed CLI arguments");

    let store = TaxonomyStore::new(&args.taxonomy);

    match &args.command {
        Some(Command::Show) => {
            let taxonomy = store.load();
            for category in &taxonomy.categories {
                println!("{}: {}", category.name, category.keywords.join(", "));
            }
        }
        Some(Command::AddCategory { name }) => {
            let mut taxonomy = store.load();
            store.add_category(&mut taxonomy, name)?;
            info!(category = %name, "Category added");
        }
        Some(Command::RemoveCategory { name }) => {
            let mut taxonomy = store.load();
            store.remove_category(&mut taxonomy, name)?;
            info!(category = %name, "Category removed");
        }
        Some(Command::AddKeyword { category, keyword }) => {
            let mut taxonomy = store.load();
            store.add_keyword(&mut taxonomy, category, keyword)?;
            info!(category = %category, keyword = %keyword, "Keyword added");
        }
        Some(Command::RemoveKeyword { category, keyword }) => {
            let mut taxonomy = store.load();
            store.remove_keyword(&mut taxonomy, category, keyword)?;
            info!(category = %category, keyword = %keyword, "Keyword removed");
        }
        None => run_clipping(&args, &store).await?,
    }

    Ok(())
}

/// Collect the current reporting window's clippings and write both outputs.
async fn run_clipping(args: &Cli, store: &TaxonomyStore) -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();
    info!("news_clipper starting up");

    let taxonomy = store.load();
    let window = ReportingWindow::current(Local::now().date_naive());
    info!(start = %window.start, end = %window.end, "Reporting window");

    let client = GoogleNewsClient::new(&args.language, &args.country, args.max_results);
    let config = PipelineConfig {
        granularity: if args.per_keyword {
            QueryGranularity::PerKeyword
        } else {
            QueryGranularity::PerCategory
        },
        dedup: if args.prefer_score {
            DedupPolicy::HighestScore
        } else {
            DedupPolicy::LastWins
        },
        ..PipelineConfig::default()
    };

    let records = pipeline::collect(&taxonomy, &window, &client, &config).await;
    if records.is_empty() {
        // Empty is a valid outcome: no keywords, or simply a quiet week.
        warn!("Nothing found for this window");
    }

    let report = ClippingReport {
        start_date: window.start,
        end_date: window.end,
        articles: records,
    };

    // The spreadsheet carries the operator's selection; without an
    // interactive surface that is the whole ranked list, or the top N.
    let mut selection = Selection::new();
    let picked = args.top.unwrap_or(report.articles.len());
    for record in report.articles.iter().take(picked) {
        selection.select(&record.url);
    }

    let json_path = json::write_report(&report, &args.output_dir).await?;
    let xlsx_path =
        xlsx::write_report(&selection.records(&report.articles), &args.output_dir, window.end)
            .await?;

    let elapsed = start_time.elapsed();
    info!(
        articles = report.articles.len(),
        exported = selection.len(),
        json = %json_path.display(),
        xlsx = %xlsx_path.display(),
        ?elapsed,
        "Execution complete"
    );

    Ok(())
}
