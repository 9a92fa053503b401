//! Service layer for billsplit
//!
//! Each stage of a reconciliation run lives in its own module; `pipeline`
//! wires them together over a transaction source and a ledger store.

pub mod allocate;
pub mod extract;
pub mod merge;
pub mod pipeline;

pub use allocate::{split_amount, Allocator};
pub use extract::extract_pending;
pub use merge::{merge, MergePlan, Snapshot};
pub use pipeline::{RunOutcome, SplitPipeline};
