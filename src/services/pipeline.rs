//! Reconciliation pipeline
//!
//! One run reads the source, selects the flagged rows the party's ledger
//! doesn't have yet, allocates them, merges them in, and commits the result.
//! Nothing is written unless every stage succeeds.

use chrono::NaiveDate;
use log::{info, warn};

use crate::audit::{AuditLogger, RunRecord};
use crate::error::SplitResult;
use crate::models::{AllocatedTransaction, Ledger, Party, SplitMarker};
use crate::source::{DateRange, TransactionSource};
use crate::storage::LedgerStore;

use super::allocate::Allocator;
use super::extract::extract_pending;
use super::merge::merge;

/// Result of a successful run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every flagged transaction was already reconciled; nothing was written
    NothingToDo { party: Party },

    /// New rows were merged and committed
    Reconciled {
        party: Party,
        /// Rows added by this run, in source order
        added: Vec<AllocatedTransaction>,
        /// Snapshot sheet taken of the previous ledger
        snapshot: Option<String>,
        /// Ledger size after the run
        ledger_rows: usize,
    },
}

impl RunOutcome {
    /// Number of rows the run added
    pub fn added_count(&self) -> usize {
        match self {
            RunOutcome::NothingToDo { .. } => 0,
            RunOutcome::Reconciled { added, .. } => added.len(),
        }
    }
}

/// Runs reconciliation for one party
pub struct SplitPipeline<S: TransactionSource> {
    source: S,
    store: LedgerStore,
    marker: SplitMarker,
    party: Party,
    drop_columns: Vec<String>,
    audit: Option<AuditLogger>,
}

impl<S: TransactionSource> SplitPipeline<S> {
    pub fn new(
        source: S,
        store: LedgerStore,
        marker: SplitMarker,
        party: Party,
        drop_columns: Vec<String>,
    ) -> Self {
        Self {
            source,
            store,
            marker,
            party,
            drop_columns,
            audit: None,
        }
    }

    /// Append a record to `logger` after every committed run
    pub fn with_audit(mut self, logger: AuditLogger) -> Self {
        self.audit = Some(logger);
        self
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Reconcile the party's ledger against the source
    ///
    /// `today` names the snapshot taken of the previous ledger.
    pub fn run(&self, range: &DateRange, today: NaiveDate) -> SplitResult<RunOutcome> {
        let party = self.party;
        info!("Reconciling {} from {}", party, self.store.path().display());

        let table = self.source.load(range)?;
        info!("Loaded {} transaction(s) from source", table.len());

        let existing = self.store.load_existing(party)?;
        let existing_sheet = existing.is_some();
        let ledger = existing.unwrap_or_else(|| Ledger::new(party));

        let pending = match extract_pending(&table, &ledger, &self.marker) {
            Ok(pending) => pending,
            Err(e) if e.is_no_pending() => {
                info!("{}", e);
                return Ok(RunOutcome::NothingToDo { party });
            }
            Err(e) => return Err(e),
        };
        info!("{} transaction(s) pending for {}", pending.len(), party);

        let allocator = Allocator::new(&self.marker, party, &self.drop_columns);
        let added = allocator.allocate(pending)?;

        let plan = merge(ledger, existing_sheet, added.clone(), today)?;
        self.store.commit(&plan)?;

        if let Some(audit) = &self.audit {
            // The ledger is already committed; a lost audit line is not fatal
            if let Err(e) = audit.log(&RunRecord::new(party, &plan)) {
                warn!("Failed to append to {}: {}", audit.path().display(), e);
            }
        }

        Ok(RunOutcome::Reconciled {
            party,
            added,
            snapshot: plan.snapshot.map(|s| s.name),
            ledger_rows: plan.ledger.len(),
        })
    }
}
