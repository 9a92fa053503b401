//! Custom error types for billsplit
//!
//! This module defines the error hierarchy for the reconciliation pipeline
//! using thiserror for ergonomic error definitions.

use thiserror::Error;

/// A single malformed ratio annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatioIssue {
    /// Identifier of the offending transaction
    pub id: String,
    /// What was wrong with the annotation
    pub reason: String,
}

impl std::fmt::Display for RatioIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.reason)
    }
}

/// The main error type for billsplit operations
#[derive(Error, Debug)]
pub enum SplitError {
    /// Transaction source could not be read (no files, bad key column, ...)
    #[error("Source read error: {0}")]
    SourceRead(String),

    /// Every flagged transaction is already in the ledger
    #[error("No pending transactions for {party}: all flagged rows are already reconciled")]
    NoPendingTransactions { party: String },

    /// One or more ratio annotations could not be parsed
    #[error("Malformed ratio annotation in {} transaction(s): {}", .issues.len(), format_issues(.issues))]
    RatioFormat { issues: Vec<RatioIssue> },

    /// A snapshot sheet with this name already exists
    #[error("Sheet already exists: {0}")]
    NameCollision(String),

    /// The acting party does not line up with the ledger's columns
    #[error("Party mismatch: {0}")]
    PartyMismatch(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Workbook storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

fn format_issues(issues: &[RatioIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl SplitError {
    /// Identifiers of the transactions that caused this error, if any
    pub fn offending_ids(&self) -> Vec<&str> {
        match self {
            Self::RatioFormat { issues } => issues.iter().map(|i| i.id.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Check if this is the expected "nothing to reconcile" condition
    pub fn is_no_pending(&self) -> bool {
        matches!(self, Self::NoPendingTransactions { .. })
    }
}

impl From<std::io::Error> for SplitError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SplitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for SplitError {
    fn from(err: csv::Error) -> Self {
        Self::SourceRead(err.to_string())
    }
}

/// Result type alias for billsplit operations
pub type SplitResult<T> = Result<T, SplitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SplitError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_ratio_error_lists_every_id() {
        let err = SplitError::RatioFormat {
            issues: vec![
                RatioIssue {
                    id: "a1".into(),
                    reason: "expected two values".into(),
                },
                RatioIssue {
                    id: "b2".into(),
                    reason: "'abc' is not a number".into(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 transaction(s)"));
        assert!(msg.contains("a1 (expected two values)"));
        assert!(msg.contains("b2"));
        assert_eq!(err.offending_ids(), vec!["a1", "b2"]);
    }

    #[test]
    fn test_no_pending_is_flagged() {
        let err = SplitError::NoPendingTransactions { party: "U1".into() };
        assert!(err.is_no_pending());
        assert!(!SplitError::Io("x".into()).is_no_pending());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SplitError = io_err.into();
        assert!(matches!(err, SplitError::Io(_)));
    }
}
