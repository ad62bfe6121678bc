//! JSON report output.
//!
//! Serializes the full [`ClippingReport`] — window plus ranked records —
//! for consumption by presentation layers or ad hoc inspection.

use crate::models::ClippingReport;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// Write a [`ClippingReport`] to `{output_dir}/clipping_{end_date}.json`.
///
/// Creates the output directory if necessary and returns the written path.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir))]
pub async fn write_report(
    report: &ClippingReport,
    output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    fs::create_dir_all(output_dir).await?;
    let path = PathBuf::from(output_dir).join(format!("clipping_{}.json", report.end_date));

    fs::write(&path, json).await?;
    info!(path = %path.display(), articles = report.articles.len(), "Wrote JSON report");
    Ok(path)
}
