//! Ratio parsing and share allocation
//!
//! Turns flagged transactions into ledger rows: the memo is cut at the split
//! marker, the annotation after it is parsed into two ratios, and the amount
//! is divided between the parties. The whole batch fails if any annotation
//! is malformed, with every offending transaction reported at once.

use log::debug;

use crate::error::{RatioIssue, SplitError, SplitResult};
use crate::models::{AllocatedTransaction, Amount, Party, RatioAnnotation, SplitMarker, Transaction};

/// Allocates flagged transactions for the acting party
pub struct Allocator<'a> {
    marker: &'a SplitMarker,
    party: Party,
    drop_columns: &'a [String],
}

impl<'a> Allocator<'a> {
    /// Create a new allocator
    pub fn new(marker: &'a SplitMarker, party: Party, drop_columns: &'a [String]) -> Self {
        Self {
            marker,
            party,
            drop_columns,
        }
    }

    /// Allocate every row, or fail listing all malformed annotations
    pub fn allocate(&self, rows: Vec<Transaction>) -> SplitResult<Vec<AllocatedTransaction>> {
        let mut allocated = Vec::with_capacity(rows.len());
        let mut issues = Vec::new();

        for txn in rows {
            match self.allocate_one(txn) {
                Ok(row) => allocated.push(row),
                Err(issue) => issues.push(issue),
            }
        }

        if !issues.is_empty() {
            return Err(SplitError::RatioFormat { issues });
        }

        Ok(allocated)
    }

    /// Allocate a single transaction
    pub fn allocate_one(&self, txn: Transaction) -> Result<AllocatedTransaction, RatioIssue> {
        let issue = |reason: String| RatioIssue {
            id: txn.id.clone(),
            reason,
        };

        let (memo, annotation) = self
            .marker
            .split(&txn.memo)
            .ok_or_else(|| issue("split marker not found in memo".to_string()))?;

        let ratio = RatioAnnotation::parse(annotation).map_err(issue)?;
        let memo = memo.trim().to_string();

        let (share_a, share_b) = split_amount(txn.amount, ratio, self.party);

        debug!(
            "{}: {} split {}:{} -> {} / {}",
            txn.id, txn.amount, ratio.a, ratio.b, share_a, share_b
        );

        let fields = txn
            .fields
            .into_iter()
            .filter(|f| !self.drop_columns.iter().any(|d| d == &f.name))
            .collect();

        Ok(AllocatedTransaction {
            id: txn.id,
            date_text: txn.date_text,
            date: txn.date,
            memo,
            fields,
            ratio_a: ratio.a,
            ratio_b: ratio.b,
            party: self.party,
            amount: txn.amount,
            share_a,
            share_b,
            agreed: String::new(),
            corrected: String::new(),
            settled: false,
        })
    }
}

/// Divide `amount` by `ratio`, returning (share_a, share_b)
///
/// The other party's share is rounded; the acting party absorbs the
/// remainder, so the two shares always add back up to `amount`.
pub fn split_amount(amount: Amount, ratio: RatioAnnotation, acting: Party) -> (Amount, Amount) {
    let other = acting.other();
    let other_ratio = match other {
        Party::U1 => ratio.a,
        Party::U2 => ratio.b,
    };
    let other_share = amount.proportion(other_ratio, ratio.total());
    let acting_share = amount - other_share;

    match acting {
        Party::U1 => (acting_share, other_share),
        Party::U2 => (other_share, acting_share),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker() -> SplitMarker {
        SplitMarker::new(&["割勘"]).unwrap()
    }

    fn drop() -> Vec<String> {
        vec!["計算対象".to_string(), "振替".to_string()]
    }

    fn txn(id: &str, amount: i64, memo: &str) -> Transaction {
        Transaction::new(id, "2024/03/01", Amount::new(amount), memo)
            .with_field("計算対象", "1")
            .with_field("内容", "居酒屋")
            .with_field("振替", "0")
    }

    #[test]
    fn test_two_to_one_split() {
        let m = marker();
        let d = drop();
        let allocator = Allocator::new(&m, Party::U1, &d);
        let rows = allocator.allocate(vec![txn("1", 3000, "dinner 割勘 2:1")]).unwrap();

        let row = &rows[0];
        assert_eq!(row.memo, "dinner");
        assert_eq!(row.ratio_a, 2.0);
        assert_eq!(row.ratio_b, 1.0);
        assert_eq!(row.share_a.units(), 2000);
        assert_eq!(row.share_b.units(), 1000);
        assert_eq!(row.party, Party::U1);
        assert!(row.agreed.is_empty());
        assert!(row.corrected.is_empty());
        assert!(!row.settled);
    }

    #[test]
    fn test_drops_configured_columns() {
        let m = marker();
        let d = drop();
        let allocator = Allocator::new(&m, Party::U1, &d);
        let row = allocator.allocate_one(txn("1", -900, "割勘 1:1")).unwrap();
        let names: Vec<_> = row.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["内容"]);
    }

    #[test]
    fn test_shares_always_sum_to_amount() {
        let m = marker();
        let d = drop();
        for party in Party::ALL {
            let allocator = Allocator::new(&m, party, &d);
            for (amount, memo) in [
                (1000, "割勘 1:2"),
                (-1001, "割勘 1:1"),
                (7, "割勘 3;4"),
                (-99999, "割勘 0.3:0.7"),
                (500, "割勘 0:1"),
            ] {
                let row = allocator.allocate_one(txn("x", amount, memo)).unwrap();
                assert!(row.is_balanced(), "{} {} {:?}", amount, memo, party);
            }
        }
    }

    #[test]
    fn test_acting_party_absorbs_rounding() {
        let ratio = RatioAnnotation { a: 1.0, b: 2.0 };
        // Other party's share is round(1000 * 2/3) = 667 when U1 acts
        let (a, b) = split_amount(Amount::new(1000), ratio, Party::U1);
        assert_eq!((a.units(), b.units()), (333, 667));
        // Other party's share is round(1000 * 1/3) = 333 when U2 acts
        let (a, b) = split_amount(Amount::new(1000), ratio, Party::U2);
        assert_eq!((a.units(), b.units()), (333, 667));

        let ratio = RatioAnnotation { a: 1.0, b: 1.0 };
        let (a, b) = split_amount(Amount::new(1001), ratio, Party::U1);
        assert_eq!((a.units(), b.units()), (500, 501));
        let (a, b) = split_amount(Amount::new(1001), ratio, Party::U2);
        assert_eq!((a.units(), b.units()), (501, 500));
    }

    #[test]
    fn test_malformed_rows_reported_together() {
        let m = marker();
        let d = drop();
        let allocator = Allocator::new(&m, Party::U1, &d);
        let err = allocator
            .allocate(vec![
                txn("good", 100, "割勘 1:1"),
                txn("bad1", 100, "割勘 abc"),
                txn("bad2", 100, "lunch 割勘"),
            ])
            .unwrap_err();

        assert_eq!(err.offending_ids(), vec!["bad1", "bad2"]);
    }

    #[test]
    fn test_zero_ratios_rejected() {
        let m = marker();
        let d = drop();
        let allocator = Allocator::new(&m, Party::U2, &d);
        let issue = allocator.allocate_one(txn("z", 100, "割勘 0:0")).unwrap_err();
        assert_eq!(issue.id, "z");
    }
}
