//! Ledger model
//!
//! A ledger is the reconciled, date-sorted list of split transactions kept
//! for one party. Rows carry the parsed ratios, both computed shares, and the
//! workflow flags the parties edit by hand afterwards.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::amount::Amount;
use super::party::Party;
use super::transaction::Field;

/// Fixed ledger column headers
pub mod columns {
    pub const ID: &str = "ID";
    pub const DATE: &str = "Date";
    pub const MEMO: &str = "Memo";
    pub const AGREED: &str = "Agreed";
    pub const CORRECTED: &str = "Corrected";
    pub const SETTLED: &str = "Settled";
}

/// A transaction after its split has been computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocatedTransaction {
    pub id: String,
    pub date_text: String,
    pub date: Option<NaiveDate>,

    /// Memo text that preceded the split marker
    pub memo: String,

    /// Passthrough columns that survived the drop set
    pub fields: Vec<Field>,

    pub ratio_a: f64,
    pub ratio_b: f64,

    /// Party whose export the amount came from
    pub party: Party,

    pub amount: Amount,
    pub share_a: Amount,
    pub share_b: Amount,

    /// Free-text agreement note
    #[serde(default)]
    pub agreed: String,

    /// Free-text correction note
    #[serde(default)]
    pub corrected: String,

    #[serde(default)]
    pub settled: bool,
}

impl AllocatedTransaction {
    pub fn ratio(&self, party: Party) -> f64 {
        match party {
            Party::U1 => self.ratio_a,
            Party::U2 => self.ratio_b,
        }
    }

    pub fn share(&self, party: Party) -> Amount {
        match party {
            Party::U1 => self.share_a,
            Party::U2 => self.share_b,
        }
    }

    /// Whether both shares add back up to the amount
    pub fn is_balanced(&self) -> bool {
        self.share_a + self.share_b == self.amount
    }
}

/// The reconciled rows for one party
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    party: Party,
    rows: Vec<AllocatedTransaction>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new(party: Party) -> Self {
        Self {
            party,
            rows: Vec::new(),
        }
    }

    /// Create a ledger from rows, keeping their order
    pub fn from_rows(party: Party, rows: Vec<AllocatedTransaction>) -> Self {
        Self { party, rows }
    }

    pub fn party(&self) -> Party {
        self.party
    }

    pub fn rows(&self) -> &[AllocatedTransaction] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<AllocatedTransaction> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Identifiers already reconciled in this ledger
    pub fn ids(&self) -> HashSet<&str> {
        self.rows.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rows.iter().any(|r| r.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&AllocatedTransaction> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Passthrough column names in first-seen order across all rows
    pub fn field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for row in &self.rows {
            for field in &row.fields {
                if !names.iter().any(|n| n == &field.name) {
                    names.push(field.name.clone());
                }
            }
        }
        names
    }

    /// Sum of one party's shares over rows not yet settled
    pub fn outstanding(&self, party: Party) -> Amount {
        self.rows
            .iter()
            .filter(|r| !r.settled)
            .map(|r| r.share(party))
            .sum()
    }

    /// Sum of one party's shares over every row
    pub fn total_share(&self, party: Party) -> Amount {
        self.rows.iter().map(|r| r.share(party)).sum()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::transaction::parse_date;

    /// Build an allocated row with a 1:1 split
    pub fn row(id: &str, date: &str, amount: i64) -> AllocatedTransaction {
        let amount = Amount::new(amount);
        let share_b = amount.proportion(1.0, 2.0);
        AllocatedTransaction {
            id: id.to_string(),
            date_text: date.to_string(),
            date: parse_date(date),
            memo: String::new(),
            fields: Vec::new(),
            ratio_a: 1.0,
            ratio_b: 1.0,
            party: Party::U1,
            amount,
            share_a: amount - share_b,
            share_b,
            agreed: String::new(),
            corrected: String::new(),
            settled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::row;
    use super::*;

    #[test]
    fn test_ids_and_contains() {
        let ledger = Ledger::from_rows(
            Party::U1,
            vec![row("a", "2024/01/02", 100), row("b", "2024/01/01", 200)],
        );
        assert!(ledger.contains("a"));
        assert!(!ledger.contains("c"));
        assert_eq!(ledger.ids().len(), 2);
        assert_eq!(ledger.get("b").unwrap().amount.units(), 200);
    }

    #[test]
    fn test_field_names_first_seen_order() {
        let mut a = row("a", "2024/01/02", 100);
        a.fields = vec![Field::new("内容", "x"), Field::new("大項目", "y")];
        let mut b = row("b", "2024/01/01", 200);
        b.fields = vec![Field::new("中項目", "z"), Field::new("内容", "w")];
        let ledger = Ledger::from_rows(Party::U1, vec![a, b]);
        assert_eq!(ledger.field_names(), vec!["内容", "大項目", "中項目"]);
    }

    #[test]
    fn test_outstanding_skips_settled() {
        let mut settled = row("a", "2024/01/02", 100);
        settled.settled = true;
        let ledger = Ledger::from_rows(Party::U1, vec![settled, row("b", "2024/01/01", 300)]);
        assert_eq!(ledger.outstanding(Party::U2).units(), 150);
        assert_eq!(ledger.total_share(Party::U2).units(), 200);
    }

    #[test]
    fn test_balanced() {
        assert!(row("a", "2024/01/01", 1001).is_balanced());
    }
}
