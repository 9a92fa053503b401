//! Flag extraction
//!
//! Picks the transactions whose memo carries the split marker and that the
//! party's ledger has not already reconciled.

use log::debug;

use crate::error::{SplitError, SplitResult};
use crate::models::{Ledger, SplitMarker, Transaction, TransactionTable};

/// Select flagged transactions not yet present in `ledger`
///
/// Returns [`SplitError::NoPendingTransactions`] when nothing is left; that is
/// the normal outcome of re-running on an already reconciled export.
pub fn extract_pending(
    table: &TransactionTable,
    ledger: &Ledger,
    marker: &SplitMarker,
) -> SplitResult<Vec<Transaction>> {
    let reconciled = ledger.ids();

    let flagged: Vec<&Transaction> = table.iter().filter(|t| marker.is_match(&t.memo)).collect();

    let pending: Vec<Transaction> = flagged
        .iter()
        .filter(|t| !reconciled.contains(t.id.as_str()))
        .map(|t| (*t).clone())
        .collect();

    debug!(
        "{} of {} transactions flagged, {} already reconciled in {}",
        flagged.len(),
        table.len(),
        flagged.len() - pending.len(),
        ledger.party()
    );

    if pending.is_empty() {
        return Err(SplitError::NoPendingTransactions {
            party: ledger.party().to_string(),
        });
    }

    Ok(pending)
}
