//! Run audit log for billsplit
//!
//! Every committed reconciliation appends one line-delimited JSON record
//! (JSONL) to `audit.log`: when it ran, for which party, which ids it added,
//! and which snapshot it took. Runs that write nothing record nothing.
//!
//! # Example
//!
//! ```rust,ignore
//! use billsplit::audit::{AuditLogger, RunRecord};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log(&RunRecord::new(Party::U1, &plan))?;
//! ```

mod entry;
mod logger;

pub use entry::RunRecord;
pub use logger::AuditLogger;
