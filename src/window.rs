//! Weekly reporting window calculation.
//!
//! Clippings cover a fixed Friday-to-Thursday week: the window ends on the
//! most recent Thursday on or before today (today itself when today is a
//! Thursday) and starts six days earlier, the preceding Friday. Both ends
//! are inclusive.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A closed 7-day calendar interval `[start, end]` ending on a Thursday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReportingWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportingWindow {
    /// The reporting window containing or most recently preceding `today`.
    pub fn current(today: NaiveDate) -> Self {
        let weekday = today.weekday().num_days_from_monday();
        let thursday = Weekday::Thu.num_days_from_monday();
        let days_back = (weekday + 7 - thursday) % 7;

        let end = today - Duration::days(i64::from(days_back));
        ReportingWindow {
            start: end - Duration::days(6),
            end,
        }
    }

    /// Whether `date` falls inside the window, inclusive at both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
