//! Ledger display formatting

use crate::models::{AllocatedTransaction, Ledger, Party};
use crate::services::RunOutcome;
use crate::storage::ArchiveInfo;

/// Format a single ledger row
pub fn format_ledger_row(row: &AllocatedTransaction) -> String {
    let settled = if row.settled { "✓" } else { " " };
    let date = match row.date {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => row.date_text.clone(),
    };
    let ratio = format!("{}:{}", trim_float(row.ratio_a), trim_float(row.ratio_b));

    format!(
        "{} {:10} {} {:7} {:>12} {:>12} {:>12}",
        settled,
        truncate(&date, 10),
        pad(&truncate(&row.memo, 24), 24),
        ratio,
        row.amount.to_string(),
        row.share_a.to_string(),
        row.share_b.to_string()
    )
}

/// Format a whole ledger with totals
pub fn format_ledger(ledger: &Ledger) -> String {
    if ledger.is_empty() {
        return format!("No reconciled transactions for {}.\n", ledger.party());
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:1} {:10} {} {:7} {:>12} {:>12} {:>12}\n",
        "S",
        "Date",
        pad("Memo", 24),
        "Ratio",
        "Amount",
        Party::U1.share_column(),
        Party::U2.share_column()
    ));
    output.push_str(&"-".repeat(86));
    output.push('\n');

    for row in ledger.rows() {
        output.push_str(&format_ledger_row(row));
        output.push('\n');
    }

    output.push('\n');
    output.push_str(&format!("Rows: {}\n", ledger.len()));
    for party in Party::ALL {
        output.push_str(&format!(
            "{}: total {}, unsettled {}\n",
            party,
            ledger.total_share(party),
            ledger.outstanding(party)
        ));
    }

    output
}

/// Summarize a pipeline run
pub fn format_run_outcome(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::NothingToDo { party } => {
            format!("Nothing to reconcile for {}: every flagged transaction is already in the ledger.\n", party)
        }
        RunOutcome::Reconciled {
            party,
            added,
            snapshot,
            ledger_rows,
        } => {
            let mut output = format!("Reconciled {} new transaction(s) for {}\n", added.len(), party);
            for row in added {
                output.push_str(&format!("  {} {}\n", row.id, format_ledger_row(row)));
            }
            if let Some(name) = snapshot {
                output.push_str(&format!("Previous ledger archived as {}\n", name));
            }
            output.push_str(&format!("Ledger now has {} row(s)\n", ledger_rows));
            output
        }
    }
}

/// Format a list of archive snapshots
pub fn format_archive_list(party: Party, archives: &[ArchiveInfo]) -> String {
    if archives.is_empty() {
        return format!("No archives for {}.\n", party);
    }

    let mut output = format!("Archives for {}\n", party);
    for (i, archive) in archives.iter().enumerate() {
        output.push_str(&format!(
            "  {}. {} ({} row(s))\n",
            i + 1,
            archive.name,
            archive.rows
        ));
    }
    output.push_str(&format!("\nTotal: {} archive(s)\n", archives.len()));
    output
}

fn trim_float(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Truncate to `max` characters, marking the cut with "..."
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Left-align to `width` characters
fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    format!("{}{}", s, " ".repeat(width.saturating_sub(len)))
}
