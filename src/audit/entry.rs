//! Audit record for one committed run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Party;
use crate::services::merge::MergePlan;

/// A single committed reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// When the run was committed (UTC)
    pub timestamp: DateTime<Utc>,

    /// Acting party
    pub party: Party,

    /// Transaction ids added by the run
    pub added: Vec<String>,

    /// Snapshot sheet taken before the ledger was replaced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,

    /// Ledger size after the run
    pub ledger_rows: usize,
}

impl RunRecord {
    /// Record a merge plan that has just been committed
    pub fn new(party: Party, plan: &MergePlan) -> Self {
        Self {
            timestamp: Utc::now(),
            party,
            added: plan.added.clone(),
            snapshot: plan.snapshot.as_ref().map(|s| s.name.clone()),
            ledger_rows: plan.ledger.len(),
        }
    }

    /// Format the record for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} +{} row(s), ledger now {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.party,
            self.added.len(),
            self.ledger_rows
        );

        if let Some(name) = &self.snapshot {
            output.push_str(&format!("\n  Snapshot: {}", name));
        }

        output
    }
}
