//! Ledger <-> sheet layout
//!
//! Column order: ID, Date, passthrough columns, Memo, both ratios, the three
//! workflow flags, the acting party's amount, then both shares. The ID column
//! always comes first and keys the rows on reload.

use std::collections::HashSet;

use crate::error::{SplitError, SplitResult};
use crate::models::ledger::columns;
use crate::models::{
    format_date, parse_date_as, AllocatedTransaction, Amount, Field, Ledger, Party,
};

use super::workbook::{Cell, Sheet};

/// Lay a ledger out as a sheet named `name`
///
/// Fails with [`SplitError::Config`] if `date_format` is not valid strftime.
pub fn ledger_to_sheet(name: &str, ledger: &Ledger, date_format: &str) -> SplitResult<Sheet> {
    let party = ledger.party();
    let field_names = ledger.field_names();

    let mut header = vec![Cell::text(columns::ID), Cell::text(columns::DATE)];
    header.extend(field_names.iter().map(Cell::text));
    header.push(Cell::text(columns::MEMO));
    for p in Party::ALL {
        header.push(Cell::text(p.ratio_column()));
    }
    header.push(Cell::text(columns::AGREED));
    header.push(Cell::text(columns::CORRECTED));
    header.push(Cell::text(columns::SETTLED));
    header.push(Cell::text(party.amount_column()));
    for p in Party::ALL {
        header.push(Cell::text(p.share_column()));
    }

    let mut rows = vec![header];
    for txn in ledger.rows() {
        let date = match txn.date {
            Some(date) => format_date(date, date_format)?,
            None => txn.date_text.clone(),
        };

        let mut row = vec![Cell::text(&txn.id), Cell::text(date)];
        for name in &field_names {
            let value = txn
                .fields
                .iter()
                .find(|f| &f.name == name)
                .map(|f| f.value.clone())
                .unwrap_or_default();
            row.push(Cell::Text(value));
        }
        row.push(Cell::text(&txn.memo));
        row.push(Cell::Number(txn.ratio_a));
        row.push(Cell::Number(txn.ratio_b));
        row.push(Cell::text(&txn.agreed));
        row.push(Cell::text(&txn.corrected));
        row.push(Cell::Bool(txn.settled));
        row.push(Cell::Number(txn.amount.units() as f64));
        row.push(Cell::Number(txn.share_a.units() as f64));
        row.push(Cell::Number(txn.share_b.units() as f64));
        rows.push(row);
    }

    Ok(Sheet {
        name: name.to_string(),
        rows,
    })
}

/// Read a party's ledger back from its sheet
///
/// Dates are parsed with `date_format` first, then the export formats.
/// Fails with [`SplitError::PartyMismatch`] if the sheet was not written for
/// `party` (its amount or ratio columns are missing).
pub fn sheet_to_ledger(sheet: &Sheet, party: Party, date_format: &str) -> SplitResult<Ledger> {
    let headers = sheet.headers();
    if headers.is_empty() {
        return Ok(Ledger::new(party));
    }

    if headers[0] != columns::ID {
        return Err(SplitError::Storage(format!(
            "sheet '{}' does not start with an {} column",
            sheet.name,
            columns::ID
        )));
    }

    let position = |name: &str| headers.iter().position(|h| h == name);

    let party_column = |name: String| {
        position(&name).ok_or_else(|| {
            SplitError::PartyMismatch(format!(
                "sheet '{}' has no '{}' column; it was not written for {}",
                sheet.name, name, party
            ))
        })
    };
    let amount_idx = party_column(party.amount_column())?;
    let ratio_a_idx = party_column(Party::U1.ratio_column())?;
    let ratio_b_idx = party_column(Party::U2.ratio_column())?;

    let required = |name: String| {
        position(&name).ok_or_else(|| {
            SplitError::Storage(format!("sheet '{}' has no '{}' column", sheet.name, name))
        })
    };
    let date_idx = required(columns::DATE.to_string())?;
    let share_a_idx = required(Party::U1.share_column())?;
    let share_b_idx = required(Party::U2.share_column())?;

    let memo_idx = position(columns::MEMO);
    let agreed_idx = position(columns::AGREED);
    let corrected_idx = position(columns::CORRECTED);
    let settled_idx = position(columns::SETTLED);

    let known: HashSet<usize> = [
        Some(0),
        Some(date_idx),
        Some(amount_idx),
        Some(ratio_a_idx),
        Some(ratio_b_idx),
        Some(share_a_idx),
        Some(share_b_idx),
        memo_idx,
        agreed_idx,
        corrected_idx,
        settled_idx,
    ]
    .into_iter()
    .flatten()
    .collect();

    // Columns another party's amount would occupy are not passthrough either
    let foreign_amount: Vec<String> = Party::ALL.iter().map(|p| p.amount_column()).collect();

    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for (row_no, cells) in sheet.data_rows().iter().enumerate() {
        if cells.iter().all(Cell::is_empty) {
            continue;
        }

        let cell = |idx: usize| cells.get(idx).cloned().unwrap_or(Cell::Empty);
        let text = |idx: Option<usize>| idx.map(|i| cell(i).as_text()).unwrap_or_default();

        let id = cell(0).as_text().trim().to_string();
        if id.is_empty() {
            return Err(SplitError::Storage(format!(
                "sheet '{}' row {} has an empty {}",
                sheet.name,
                row_no + 2,
                columns::ID
            )));
        }
        if !seen.insert(id.clone()) {
            return Err(SplitError::Storage(format!(
                "sheet '{}' lists transaction {} more than once",
                sheet.name, id
            )));
        }

        let number = |idx: usize, what: &str| {
            cell(idx).as_number().ok_or_else(|| {
                SplitError::Storage(format!(
                    "sheet '{}' transaction {}: {} is not a number",
                    sheet.name, id, what
                ))
            })
        };

        let date_text = cell(date_idx).as_text().trim().to_string();
        let settled = settled_idx
            .map(|i| cell(i).as_bool().unwrap_or(false))
            .unwrap_or(false);

        let fields = headers
            .iter()
            .enumerate()
            .filter(|(idx, name)| !known.contains(idx) && !foreign_amount.contains(*name))
            .map(|(idx, name)| Field::new(name.clone(), cell(idx).as_text()))
            .collect();

        rows.push(AllocatedTransaction {
            date: parse_date_as(&date_text, date_format),
            date_text,
            memo: text(memo_idx),
            fields,
            ratio_a: number(ratio_a_idx, "ratio")?,
            ratio_b: number(ratio_b_idx, "ratio")?,
            party,
            amount: Amount::new(number(amount_idx, "amount")?.round() as i64),
            share_a: Amount::new(number(share_a_idx, "share")?.round() as i64),
            share_b: Amount::new(number(share_b_idx, "share")?.round() as i64),
            agreed: text(agreed_idx),
            corrected: text(corrected_idx),
            settled,
            id,
        });
    }

    Ok(Ledger::from_rows(party, rows))
}
