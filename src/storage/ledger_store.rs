//! Ledger store
//!
//! Per-party ledgers live as named sheets in a single workbook file, next to
//! their dated archive snapshots. Every mutation rewrites the whole workbook
//! through one atomic replace, so a failed run never leaves half a ledger
//! behind.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::error::{SplitError, SplitResult};
use crate::models::{Ledger, Party};
use crate::services::merge::{parse_snapshot_name, MergePlan, Snapshot};

use super::ledger_sheet::{ledger_to_sheet, sheet_to_ledger};
use super::workbook::{Sheet, Workbook};

/// Metadata about an archive snapshot sheet
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveInfo {
    /// Sheet name (`<party>_archive_<YYYY-MM-DD>`)
    pub name: String,
    /// Date the snapshot was taken
    pub date: NaiveDate,
    /// Number of ledger rows in the snapshot
    pub rows: usize,
}

/// Reads and writes party ledgers in one workbook
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
    date_format: String,
}

impl LedgerStore {
    /// Create a store over `path`; nothing is touched until the first write
    pub fn new(path: impl Into<PathBuf>, date_format: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            date_format: date_format.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the workbook file exists yet
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load a party's ledger, or None if the party has no sheet yet
    pub fn load_existing(&self, party: Party) -> SplitResult<Option<Ledger>> {
        let book = Workbook::open(&self.path)?;
        match book.get(party.as_str()) {
            Some(sheet) => {
                let ledger = sheet_to_ledger(sheet, party, &self.date_format)?;
                debug!("Loaded {} ledger with {} rows", party, ledger.len());
                Ok(Some(ledger))
            }
            None => Ok(None),
        }
    }

    /// Load a party's ledger, empty if it doesn't exist
    pub fn load(&self, party: Party) -> SplitResult<Ledger> {
        Ok(self
            .load_existing(party)?
            .unwrap_or_else(|| Ledger::new(party)))
    }

    /// Replace the party's sheet, leaving every other sheet untouched
    pub fn save(&self, ledger: &Ledger) -> SplitResult<()> {
        let mut book = Workbook::open(&self.path)?;
        self.put_ledger(&mut book, ledger)?;
        book.write_atomic(&self.path)?;
        info!(
            "Saved {} ledger ({} rows) to {}",
            ledger.party(),
            ledger.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Store a snapshot sheet; a same-named snapshot is overwritten
    pub fn snapshot(&self, name: &str, ledger: &Ledger) -> SplitResult<()> {
        let mut book = Workbook::open(&self.path)?;
        self.put_snapshot(
            &mut book,
            &Snapshot {
                name: name.to_string(),
                ledger: ledger.clone(),
            },
        )?;
        book.write_atomic(&self.path)
    }

    /// Apply a merge plan (snapshot first, then the ledger) in one write
    pub fn commit(&self, plan: &MergePlan) -> SplitResult<()> {
        let mut book = Workbook::open(&self.path)?;

        if let Some(snapshot) = &plan.snapshot {
            self.put_snapshot(&mut book, snapshot)?;
        }
        self.put_ledger(&mut book, &plan.ledger)?;

        book.write_atomic(&self.path)?;
        info!(
            "Committed {} ledger ({} rows) to {}",
            plan.ledger.party(),
            plan.ledger.len(),
            self.path.display()
        );
        Ok(())
    }

    /// List a party's archive snapshots, newest first
    pub fn list_archives(&self, party: Party) -> SplitResult<Vec<ArchiveInfo>> {
        let book = Workbook::open(&self.path)?;

        let mut archives: Vec<ArchiveInfo> = book
            .sheets()
            .iter()
            .filter_map(|sheet| {
                let date = parse_snapshot_name(party, &sheet.name)?;
                Some(ArchiveInfo {
                    name: sheet.name.clone(),
                    date,
                    rows: sheet.data_rows().len(),
                })
            })
            .collect();

        archives.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(archives)
    }

    /// Load one archive snapshot as a ledger
    pub fn load_archive(&self, party: Party, name: &str) -> SplitResult<Ledger> {
        let book = Workbook::open(&self.path)?;
        let sheet = book
            .get(name)
            .filter(|s| parse_snapshot_name(party, &s.name).is_some())
            .ok_or_else(|| SplitError::Storage(format!("no archive named '{}'", name)))?;
        sheet_to_ledger(sheet, party, &self.date_format)
    }

    fn put_ledger(&self, book: &mut Workbook, ledger: &Ledger) -> SplitResult<()> {
        let sheet = ledger_to_sheet(ledger.party().as_str(), ledger, &self.date_format)?;
        book.replace(sheet);
        Ok(())
    }

    fn put_snapshot(&self, book: &mut Workbook, snapshot: &Snapshot) -> SplitResult<()> {
        let sheet: Sheet =
            ledger_to_sheet(&snapshot.name, &snapshot.ledger, &self.date_format)?;
        match book.insert_new(sheet.clone()) {
            Ok(()) => {
                info!("Archived previous ledger as {}", snapshot.name);
                Ok(())
            }
            // Same-day reruns replace that day's recovery point
            Err(SplitError::NameCollision(name)) => {
                warn!("Snapshot {} already exists; overwriting", name);
                book.replace(sheet);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ledger::fixtures::row;
    use crate::services::merge::{merge, snapshot_name};
    use crate::storage::workbook::Cell;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> LedgerStore {
        LedgerStore::new(dir.path().join("output").join("book.xlsx"), "%Y/%m/%d")
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        assert!(store.load_existing(Party::U1).unwrap().is_none());
        assert!(store.load(Party::U1).unwrap().is_empty());
        assert!(!store.exists());
    }

    #[test]
    fn test_save_creates_file_and_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let ledger = Ledger::from_rows(Party::U1, vec![row("a", "2024/03/01", 100)]);

        store.save(&ledger).unwrap();
        assert!(store.exists());

        let loaded = store.load(Party::U1).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains("a"));
    }

    #[test]
    fn test_save_leaves_other_sheets_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        // 2024-03-05 13:45
        let stamp = 45356.0 + (13.0 * 60.0 + 45.0) / 1440.0;
        let mut book = Workbook::new();
        book.replace(Sheet {
            name: "memo".into(),
            rows: vec![vec![
                Cell::text("keep me"),
                Cell::Number(10.0),
                Cell::formula("B1*2", Cell::Number(20.0)),
                Cell::DateTime(stamp),
            ]],
        });
        book.write_atomic(store.path()).unwrap();

        store
            .save(&Ledger::from_rows(Party::U2, vec![row("b", "2024/03/01", 100)]))
            .unwrap();
        store
            .save(&Ledger::from_rows(Party::U1, vec![row("a", "2024/03/01", 100)]))
            .unwrap();

        let book = Workbook::open(store.path()).unwrap();
        assert_eq!(book.sheet_names(), vec!["memo", "U2", "U1"]);
        let memo = &book.get("memo").unwrap().rows[0];
        assert_eq!(memo[0].as_text(), "keep me");
        assert!(matches!(&memo[2], Cell::Formula { formula, .. } if formula == "B1*2"));
        assert!(matches!(memo[3], Cell::DateTime(serial) if (serial - stamp).abs() < 1e-9));
    }

    #[test]
    fn test_custom_date_format_keeps_merge_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path().join("book.xlsx"), "%d/%m/%Y");
        store
            .save(&Ledger::from_rows(
                Party::U1,
                vec![row("new", "2024/03/05", 1), row("old", "2024/01/01", 1)],
            ))
            .unwrap();

        let existing = store.load(Party::U1).unwrap();
        assert_eq!(existing.get("new").unwrap().date_text, "05/03/2024");
        assert!(existing.rows().iter().all(|r| r.date.is_some()));

        let plan = merge(existing, true, vec![row("mid", "2024/02/01", 1)], day(1)).unwrap();
        let order: Vec<_> = plan.ledger.rows().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_invalid_date_format_fails_without_writing() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path().join("book.xlsx"), "%Q");
        let ledger = Ledger::from_rows(Party::U1, vec![row("a", "2024/03/01", 1)]);

        assert!(matches!(store.save(&ledger), Err(SplitError::Config(_))));
        assert!(!store.exists());
    }

    #[test]
    fn test_commit_snapshots_then_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let old = Ledger::from_rows(Party::U1, vec![row("a", "2024/03/01", 100)]);
        store.save(&old).unwrap();

        let new = Ledger::from_rows(
            Party::U1,
            vec![row("b", "2024/03/02", 50), row("a", "2024/03/01", 100)],
        );
        let plan = MergePlan {
            ledger: new.clone(),
            snapshot: Some(Snapshot {
                name: snapshot_name(Party::U1, day(1)),
                ledger: old.clone(),
            }),
            added: vec!["b".into()],
        };
        store.commit(&plan).unwrap();

        assert_eq!(store.load(Party::U1).unwrap().len(), 2);
        let archives = store.list_archives(Party::U1).unwrap();
        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].name, "U1_archive_2024-04-01");
        assert_eq!(archives[0].rows, 1);
        assert_eq!(
            store.load_archive(Party::U1, "U1_archive_2024-04-01").unwrap().len(),
            1
        );
    }

    #[test]
    fn test_same_day_snapshot_is_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let name = snapshot_name(Party::U1, day(2));

        store
            .snapshot(&name, &Ledger::from_rows(Party::U1, vec![row("a", "2024/03/01", 1)]))
            .unwrap();
        store
            .snapshot(
                &name,
                &Ledger::from_rows(
                    Party::U1,
                    vec![row("a", "2024/03/01", 1), row("b", "2024/03/02", 2)],
                ),
            )
            .unwrap();

        let archives = store.list_archives(Party::U1).unwrap();
        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].rows, 2);
    }

    #[test]
    fn test_archives_sorted_newest_first_per_party() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let ledger = Ledger::from_rows(Party::U1, vec![row("a", "2024/03/01", 1)]);

        store.snapshot(&snapshot_name(Party::U1, day(1)), &ledger).unwrap();
        store.snapshot(&snapshot_name(Party::U1, day(3)), &ledger).unwrap();
        store.snapshot(&snapshot_name(Party::U2, day(2)), &ledger).unwrap();

        let names: Vec<_> = store
            .list_archives(Party::U1)
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["U1_archive_2024-04-03", "U1_archive_2024-04-01"]);
    }
}
