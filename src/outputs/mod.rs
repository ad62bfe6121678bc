//! Output writers for collected clippings.
//!
//! Two formats are produced per run:
//! - [`xlsx`]: the operator-facing spreadsheet with hyperlinked titles
//! - [`json`]: the full report for downstream presentation layers
//!
//! Both writers name their files after the reporting window's end date, so
//! consecutive weekly runs never collide.

pub mod json;
pub mod xlsx;
