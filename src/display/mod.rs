//! Display formatting for terminal output
//!
//! Plain-text renderings of ledgers, run outcomes, and archive listings.

pub mod ledger;

pub use ledger::{format_archive_list, format_ledger, format_ledger_row, format_run_outcome};
