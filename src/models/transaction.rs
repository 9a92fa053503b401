//! Transaction model
//!
//! A row from a transaction export: identifier, date, amount and memo, with
//! every other column carried along untouched as a passthrough field.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{SplitError, SplitResult};

use super::amount::Amount;

/// Date formats accepted for transaction dates, tried in order
const DATE_FORMATS: [&str; 4] = ["%Y/%m/%d", "%Y-%m-%d", "%Y/%m/%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a transaction date, returning None for anything unrecognized
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }
    None
}

/// Parse a date written with `format`, falling back to [`parse_date`]
pub fn parse_date_as(s: &str, format: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, format)
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(s, format)
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| parse_date(s))
}

/// Render a date with a strftime `format`
pub fn format_date(date: NaiveDate, format: &str) -> SplitResult<String> {
    let mut text = String::new();
    write!(text, "{}", date.format(format))
        .map_err(|_| SplitError::Config(format!("'{}' is not a valid date format", format)))?;
    Ok(text)
}

/// Check that `format` is valid strftime and that dates written with it
/// parse back to the same day
pub fn check_date_format(format: &str) -> SplitResult<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(SplitError::Config(format!(
            "'{}' is not a valid date format",
            format
        )));
    }

    let sample = NaiveDate::from_ymd_opt(2024, 3, 5)
        .ok_or_else(|| SplitError::Config("invalid sample date".into()))?;
    let text = format_date(sample, format)?;
    if parse_date_as(&text, format) != Some(sample) {
        return Err(SplitError::Config(format!(
            "date format '{}' does not read back the dates it writes",
            format
        )));
    }
    Ok(())
}
/// Field kept verbatim from the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A single exported transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier assigned by the export (the dedup key)
    pub id: String,

    /// Date exactly as it appeared in the export
    pub date_text: String,

    /// Parsed date, if the text was recognizable
    pub date: Option<NaiveDate>,

    /// Signed amount
    pub amount: Amount,

    /// Free-text memo (empty when the export left it blank)
    #[serde(default)]
    pub memo: String,

    /// Remaining columns in header order
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Transaction {
    /// Create a transaction with no passthrough fields
    pub fn new(
        id: impl Into<String>,
        date_text: impl Into<String>,
        amount: Amount,
        memo: impl Into<String>,
    ) -> Self {
        let date_text = date_text.into();
        Self {
            id: id.into(),
            date: parse_date(&date_text),
            date_text,
            amount,
            memo: memo.into(),
            fields: Vec::new(),
        }
    }

    /// Add a passthrough field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(Field::new(name, value));
        self
    }

    /// Look up a passthrough field by column name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// All transactions loaded for one run, in load order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionTable {
    rows: Vec<Transaction>,
}

impl TransactionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Transaction>) -> Self {
        Self { rows }
    }

    /// Append every row of another table, keeping order
    pub fn extend(&mut self, other: TransactionTable) {
        self.rows.extend(other.rows);
    }

    pub fn push(&mut self, txn: Transaction) {
        self.rows.push(txn);
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.rows.iter()
    }
}

impl IntoIterator for TransactionTable {
    type Item = Transaction;
    type IntoIter = std::vec::IntoIter<Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
