//! Core data models for billsplit
//!
//! This module contains the data structures of the reconciliation domain:
//! exported transactions, the two parties, split markers, allocated rows and
//! ledgers.

pub mod amount;
pub mod ledger;
pub mod party;
pub mod split;
pub mod transaction;

pub use amount::Amount;
pub use ledger::{AllocatedTransaction, Ledger};
pub use party::Party;
pub use split::{RatioAnnotation, SplitMarker};
pub use transaction::{
    check_date_format, format_date, parse_date, parse_date_as, Field, Transaction,
    TransactionTable,
};
