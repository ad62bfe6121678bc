//! Spreadsheet export.
//!
//! Produces the operator-facing XLSX payload: one `뉴스클리핑` sheet with
//! category, publisher, date, and the title written as a hyperlink on the
//! article URL. The hyperlink is a real URL object, not a `HYPERLINK()`
//! formula string, so quotes or a leading `=` in a title cannot corrupt
//! the cell or be interpreted as a formula.

use crate::models::ArticleRecord;
use chrono::NaiveDate;
use rust_xlsxwriter::{Url, Workbook, XlsxError};
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

const SHEET_NAME: &str = "뉴스클리핑";
const HEADERS: [&str; 4] = ["그룹", "출처", "기사일자", "제목"];

/// Serialize records into a complete XLSX payload.
///
/// An empty record list still yields a valid, openable spreadsheet with
/// just the header row.
pub fn to_spreadsheet(records: &[ArticleRecord]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_string(row, 0, &record.category)?;
        worksheet.write_string(row, 1, &record.publisher)?;
        worksheet.write_string(row, 2, record.date.format("%Y-%m-%d").to_string())?;
        worksheet.write_url(row, 3, Url::new(&record.url).set_text(&record.title))?;
    }

    for col in 0..3 {
        worksheet.set_column_width(col, 15)?;
    }
    worksheet.set_column_width(3, 80)?;

    workbook.save_to_buffer()
}

/// Write the spreadsheet to `{output_dir}/news_clipping_{end_date}.xlsx`
/// and return the written path.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir))]
pub async fn write_report(
    records: &[ArticleRecord],
    output_dir: &str,
    end_date: NaiveDate,
) -> Result<PathBuf, Box<dyn Error>> {
    let payload = to_spreadsheet(records)?;

    fs::create_dir_all(output_dir).await?;
    let path = PathBuf::from(output_dir).join(format!("news_clipping_{end_date}.xlsx"));

    fs::write(&path, payload).await?;
    info!(path = %path.display(), rows = records.len(), "Wrote XLSX export");
    Ok(path)
}
