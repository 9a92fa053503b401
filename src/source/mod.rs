//! Transaction sources
//!
//! A source hands the pipeline every exported transaction for a date range
//! as one table. The only implementation reads a directory of per-period CSV
//! snapshots; downloading those snapshots is somebody else's job.

pub mod csv_dir;

pub use csv_dir::{ColumnMapping, CsvDirectorySource};

use chrono::{Datelike, NaiveDate};

use crate::error::{SplitError, SplitResult};
use crate::models::TransactionTable;

/// Provider of exported transactions
pub trait TransactionSource {
    /// Load every transaction in `range`, concatenated into one table
    fn load(&self, range: &DateRange) -> SplitResult<TransactionTable>;
}

/// Inclusive range of months; either end may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl DateRange {
    /// Every available month
    pub fn all() -> Self {
        Self::default()
    }

    /// Months from `from` to `to` inclusive (days are ignored)
    pub fn months(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            from: from.map(first_of_month),
            to: to.map(first_of_month),
        }
    }

    /// Parse the `YYYY-MM` form used by snapshot file names and the CLI
    pub fn parse_month(s: &str) -> SplitResult<NaiveDate> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map_err(|_| SplitError::Config(format!("expected a YYYY-MM month, got '{}'", s)))
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Whether the month containing `date` falls inside the range
    pub fn contains_month(&self, date: NaiveDate) -> bool {
        let month = first_of_month(date);
        self.from.map_or(true, |from| month >= from) && self.to.map_or(true, |to| month <= to)
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
