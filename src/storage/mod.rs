//! Storage layer for billsplit
//!
//! Ledgers and their archive snapshots are sheets of one `.xlsx` workbook.
//! The workbook is always rewritten whole through an atomic rename.

pub mod ledger_sheet;
pub mod ledger_store;
pub mod workbook;

pub use ledger_sheet::{ledger_to_sheet, sheet_to_ledger};
pub use ledger_store::{ArchiveInfo, LedgerStore};
pub use workbook::{Cell, Sheet, Workbook};
