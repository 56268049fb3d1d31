//! Bounded date windows for mailbox searches.

use chrono::{Local, Months, NaiveDate};
use tracing::warn;

use crate::error::WindowError;

/// IMAP date format (`01-Sep-2025`).
const IMAP_DATE_FORMAT: &str = "%d-%b-%Y";

/// A half-open date range `[since, before)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    since: NaiveDate,
    before: NaiveDate,
}

impl DateWindow {
    /// Creates a window, rejecting empty or inverted ranges.
    pub fn new(since: NaiveDate, before: NaiveDate) -> Result<Self, WindowError> {
        if since >= before {
            return Err(WindowError::EmptyWindow { since, before });
        }
        Ok(Self { since, before })
    }

    /// Builds the window covering a whole calendar month given as `YYYY-MM`.
    pub fn for_month(month: &str) -> Result<Self, WindowError> {
        let month = month.trim();
        if month.is_empty() {
            return Err(WindowError::EmptyMonth);
        }

        let since = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").map_err(
            |source| WindowError::InvalidMonth {
                value: month.to_string(),
                source,
            },
        )?;
        let before = since
            .checked_add_months(Months::new(1))
            .ok_or_else(|| WindowError::OutOfRange(month.to_string()))?;

        if since > Local::now().date_naive() {
            warn!("Month {} is in the future, there may be no emails", month);
        }

        Self::new(since, before)
    }

    pub fn since(&self) -> NaiveDate {
        self.since
    }

    pub fn before(&self) -> NaiveDate {
        self.before
    }

    /// UID SEARCH criteria for this window. `BEFORE` is exclusive on the server side.
    pub fn imap_query(&self) -> String {
        format!(
            "SINCE {} BEFORE {}",
            self.since.format(IMAP_DATE_FORMAT),
            self.before.format(IMAP_DATE_FORMAT)
        )
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.since, self.before)
    }
}
