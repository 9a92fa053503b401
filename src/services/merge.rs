//! Archive merging
//!
//! Folds newly allocated rows into a party's existing ledger. The existing
//! rows are carried over exactly as stored (hand-edited workflow flags
//! included) and a snapshot of the old ledger is planned before anything is
//! replaced. The result is ordered newest first.

use std::collections::HashSet;

use chrono::NaiveDate;
use log::{info, warn};

use crate::error::{SplitError, SplitResult};
use crate::models::{parse_date, AllocatedTransaction, Ledger, Party};

/// A dated copy of a ledger taken before it is overwritten
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub name: String,
    pub ledger: Ledger,
}

/// Everything a run will write, applied by the store in one commit
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    /// The merged ledger that replaces the party's sheet
    pub ledger: Ledger,
    /// Copy of the previous ledger, if there was one
    pub snapshot: Option<Snapshot>,
    /// Identifiers added by this run, in input order
    pub added: Vec<String>,
}

/// Name of the snapshot sheet for `party` taken on `date`
pub fn snapshot_name(party: Party, date: NaiveDate) -> String {
    format!("{}{}", party.archive_prefix(), date.format("%Y-%m-%d"))
}

/// Parse the date back out of a snapshot sheet name
pub fn parse_snapshot_name(party: Party, name: &str) -> Option<NaiveDate> {
    let date = name.strip_prefix(&party.archive_prefix())?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Merge `new_rows` into `existing`
///
/// `existing_sheet` says whether the party already had a ledger sheet; only
/// then is a snapshot planned, even if that sheet was empty.
pub fn merge(
    existing: Ledger,
    existing_sheet: bool,
    new_rows: Vec<AllocatedTransaction>,
    today: NaiveDate,
) -> SplitResult<MergePlan> {
    let party = existing.party();

    let snapshot = existing_sheet.then(|| Snapshot {
        name: snapshot_name(party, today),
        ledger: existing.clone(),
    });

    // The source rejects repeated ids; this only keeps the ledger keyed
    let mut seen: HashSet<&str> = existing.rows().iter().map(|r| r.id.as_str()).collect();
    let duplicates: Vec<&str> = new_rows
        .iter()
        .map(|r| r.id.as_str())
        .filter(|id| !seen.insert(*id))
        .collect();
    if !duplicates.is_empty() {
        return Err(SplitError::Storage(format!(
            "{} ledger would list transaction(s) more than once: {}",
            party,
            duplicates.join(", ")
        )));
    }

    let added: Vec<String> = new_rows.iter().map(|r| r.id.clone()).collect();

    let mut rows = existing.into_rows();
    rows.extend(new_rows);

    for row in rows.iter_mut() {
        if row.date.is_none() {
            row.date = parse_date(&row.date_text);
            if row.date.is_none() {
                warn!(
                    "Transaction {} has unparseable date '{}'; sorting it last",
                    row.id, row.date_text
                );
            }
        }
    }

    // Stable: equal dates keep their input order. None sorts below any date.
    rows.sort_by(|a, b| b.date.cmp(&a.date));

    info!(
        "Merged {} new row(s) into {} ledger ({} rows total)",
        added.len(),
        party,
        rows.len()
    );

    Ok(MergePlan {
        ledger: Ledger::from_rows(party, rows),
        snapshot,
        added,
    })
}
