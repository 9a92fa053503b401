//! Directory-of-CSV transaction source
//!
//! Reads every `.csv` snapshot in a directory, decodes it from the configured
//! character encoding, and concatenates the rows. Each snapshot must carry a
//! header row and an identifier column whose values are unique across every
//! file read.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::Encoding;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{DateRange, TransactionSource};
use crate::error::{SplitError, SplitResult};
use crate::models::{Amount, Field, Transaction, TransactionTable};

/// Header names of the columns the pipeline reads
///
/// Defaults match the Money Forward export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Unique identifier column
    pub id: String,
    /// Transaction date column
    pub date: String,
    /// Signed amount column
    pub amount: String,
    /// Free-text memo column
    pub memo: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            id: "ID".to_string(),
            date: "日付".to_string(),
            amount: "金額（円）".to_string(),
            memo: "メモ".to_string(),
        }
    }
}

impl ColumnMapping {
    /// Resolve header positions, failing on any missing required column
    fn locate(&self, headers: &StringRecord, file: &str) -> SplitResult<ColumnIndex> {
        let find = |name: &str, role: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                SplitError::SourceRead(format!("{}: {} column '{}' not found", file, role, name))
            })
        };

        Ok(ColumnIndex {
            id: find(&self.id, "identifier")?,
            date: find(&self.date, "date")?,
            amount: find(&self.amount, "amount")?,
            memo: find(&self.memo, "memo")?,
        })
    }
}

struct ColumnIndex {
    id: usize,
    date: usize,
    amount: usize,
    memo: usize,
}

impl ColumnIndex {
    fn is_core(&self, idx: usize) -> bool {
        idx == self.id || idx == self.date || idx == self.amount || idx == self.memo
    }
}

/// Reads per-period snapshot files from one directory
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    dir: PathBuf,
    encoding: &'static Encoding,
    mapping: ColumnMapping,
}

impl CsvDirectorySource {
    /// Create a source for `dir`, decoding files with the `encoding` label
    pub fn new(dir: impl Into<PathBuf>, encoding: &str, mapping: ColumnMapping) -> SplitResult<Self> {
        let encoding = Encoding::for_label(encoding.trim().as_bytes()).ok_or_else(|| {
            SplitError::SourceRead(format!("unknown character encoding '{}'", encoding))
        })?;

        Ok(Self {
            dir: dir.into(),
            encoding,
            mapping,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot files selected by `range`, in file-name order
    pub fn snapshot_files(&self, range: &DateRange) -> SplitResult<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            SplitError::SourceRead(format!(
                "Failed to read source directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SplitError::SourceRead(format!("Failed to read directory entry: {}", e))
            })?;

            let path = entry.path();
            let is_csv = path
                .extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
            if !is_csv || !path.is_file() {
                continue;
            }

            let month = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| DateRange::parse_month(s).ok());

            let selected = match month {
                Some(month) => range.contains_month(month),
                None => range.is_unbounded(),
            };
            if selected {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Decode and parse one snapshot file
    pub fn read_file(&self, path: &Path) -> SplitResult<TransactionTable> {
        let bytes = fs::read(path).map_err(|e| {
            SplitError::SourceRead(format!("Failed to read {}: {}", path.display(), e))
        })?;

        // decode() honors and strips a leading BOM
        let (content, used, had_errors) = self.encoding.decode(&bytes);
        if had_errors {
            return Err(SplitError::SourceRead(format!(
                "{} is not valid {} text",
                path.display(),
                used.name()
            )));
        }

        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        parse_snapshot(&content, &self.mapping, &label)
    }
}

impl TransactionSource for CsvDirectorySource {
    fn load(&self, range: &DateRange) -> SplitResult<TransactionTable> {
        let files = self.snapshot_files(range)?;
        if files.is_empty() {
            return Err(SplitError::SourceRead(format!(
                "no .csv snapshot files found in {}",
                self.dir.display()
            )));
        }

        let mut table = TransactionTable::new();
        let mut origin: HashMap<String, &PathBuf> = HashMap::new();
        for path in &files {
            let rows = self.read_file(path)?;
            debug!("Read {} transactions from {}", rows.len(), path.display());
            for txn in rows.iter() {
                if let Some(first) = origin.insert(txn.id.clone(), path) {
                    return Err(SplitError::SourceRead(format!(
                        "identifier '{}' appears in both {} and {}",
                        txn.id,
                        first.display(),
                        path.display()
                    )));
                }
            }
            table.extend(rows);
        }

        info!(
            "Loaded {} transactions from {} snapshot file(s) in {}",
            table.len(),
            files.len(),
            self.dir.display()
        );
        Ok(table)
    }
}

/// Parse decoded snapshot text into transactions
pub fn parse_snapshot(content: &str, mapping: &ColumnMapping, file: &str) -> SplitResult<TransactionTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| SplitError::SourceRead(format!("{}: unreadable header row: {}", file, e)))?
        .clone();
    let index = mapping.locate(&headers, file)?;

    let mut seen = HashSet::new();
    let mut table = TransactionTable::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| SplitError::SourceRead(format!("{}: row {}: {}", file, row_idx + 1, e)))?;

        let id = record.get(index.id).unwrap_or("").trim().to_string();
        if id.is_empty() {
            return Err(SplitError::SourceRead(format!(
                "{}: row {} has an empty identifier",
                file,
                row_idx + 1
            )));
        }
        if !seen.insert(id.clone()) {
            return Err(SplitError::SourceRead(format!(
                "{}: identifier '{}' is not unique",
                file, id
            )));
        }

        let amount_text = record.get(index.amount).unwrap_or("");
        let amount = Amount::parse(amount_text)
            .map_err(|e| SplitError::SourceRead(format!("{}: transaction {}: {}", file, id, e)))?;

        let date_text = record.get(index.date).unwrap_or("").trim();
        let memo = record.get(index.memo).unwrap_or("");

        let mut txn = Transaction::new(id, date_text, amount, memo);
        txn.fields = headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| !index.is_core(*idx))
            .map(|(idx, name)| Field::new(name, record.get(idx).unwrap_or("")))
            .collect();

        table.push(txn);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "計算対象,日付,内容,金額（円）,保有金融機関,大項目,中項目,メモ,振替,ID";

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), format!("{}\n{}", HEADER, body)).unwrap();
    }

    fn source(dir: &Path) -> CsvDirectorySource {
        CsvDirectorySource::new(dir, "utf-8", ColumnMapping::default()).unwrap()
    }

    #[test]
    fn test_parse_snapshot_fields() {
        let body = "1,2024/03/02,居酒屋,-3000,カード,食費,外食,dinner 割勘 2:1,0,abc";
        let table = parse_snapshot(&format!("{}\n{}", HEADER, body), &ColumnMapping::default(), "t.csv").unwrap();

        assert_eq!(table.len(), 1);
        let txn = &table.rows()[0];
        assert_eq!(txn.id, "abc");
        assert_eq!(txn.amount.units(), -3000);
        assert_eq!(txn.memo, "dinner 割勘 2:1");
        assert_eq!(txn.date_text, "2024/03/02");
        assert_eq!(txn.field("内容"), Some("居酒屋"));
        assert_eq!(txn.field("振替"), Some("0"));
        assert_eq!(txn.fields.len(), 6);
    }

    #[test]
    fn test_load_concatenates_all_files() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "2024-01.csv", "1,2024/01/05,a,-100,x,y,z,,0,id1");
        write(temp_dir.path(), "2024-02.csv", "1,2024/02/05,b,-200,x,y,z,,0,id2\n1,2024/02/06,c,-300,x,y,z,,0,id3");
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let table = source(temp_dir.path()).load(&DateRange::all()).unwrap();
        let ids: Vec<_> = table.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["id1", "id2", "id3"]);
    }

    #[test]
    fn test_range_selects_month_files() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "2024-01.csv", "1,2024/01/05,a,-100,x,y,z,,0,id1");
        write(temp_dir.path(), "2024-02.csv", "1,2024/02/05,b,-200,x,y,z,,0,id2");
        write(temp_dir.path(), "manual.csv", "1,2024/02/05,b,-200,x,y,z,,0,id9");

        let feb = DateRange::parse_month("2024-02").unwrap();
        let range = DateRange::months(Some(feb), Some(feb));
        let table = source(temp_dir.path()).load(&range).unwrap();
        let ids: Vec<_> = table.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["id2"]);
    }

    #[test]
    fn test_no_files_is_source_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = source(temp_dir.path()).load(&DateRange::all()).unwrap_err();
        assert!(matches!(err, SplitError::SourceRead(_)));

        let missing = temp_dir.path().join("nope");
        let err = source(&missing).load(&DateRange::all()).unwrap_err();
        assert!(matches!(err, SplitError::SourceRead(_)));
    }

    #[test]
    fn test_missing_id_column_is_source_error() {
        let content = "日付,金額（円）,メモ\n2024/01/01,100,x";
        let err = parse_snapshot(content, &ColumnMapping::default(), "bad.csv").unwrap_err();
        assert!(err.to_string().contains("identifier column 'ID'"));
    }

    #[test]
    fn test_duplicate_id_is_source_error() {
        let content = format!(
            "{}\n{}\n{}",
            HEADER, "1,2024/01/05,a,-100,x,y,z,,0,dup", "1,2024/01/06,b,-100,x,y,z,,0,dup"
        );
        let err = parse_snapshot(&content, &ColumnMapping::default(), "dup.csv").unwrap_err();
        assert!(err.to_string().contains("'dup' is not unique"));
    }

    #[test]
    fn test_duplicate_id_across_files_is_source_error() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "2024-01.csv", "1,2024/01/05,a,-100,x,y,z,割勘 1:1,0,same");
        write(temp_dir.path(), "2024-02.csv", "1,2024/02/05,b,-200,x,y,z,割勘 1:1,0,same");

        let err = source(temp_dir.path()).load(&DateRange::all()).unwrap_err();
        assert!(matches!(err, SplitError::SourceRead(_)));
        let message = err.to_string();
        assert!(message.contains("'same'"));
        assert!(message.contains("2024-01.csv"));
        assert!(message.contains("2024-02.csv"));
    }

    #[test]
    fn test_bad_amount_names_transaction() {
        let content = format!("{}\n{}", HEADER, "1,2024/01/05,a,lots,x,y,z,,0,id7");
        let err = parse_snapshot(&content, &ColumnMapping::default(), "amt.csv").unwrap_err();
        assert!(err.to_string().contains("id7"));
    }

    #[test]
    fn test_shift_jis_and_bom() {
        let temp_dir = TempDir::new().unwrap();
        let text = format!("{}\n{}", HEADER, "1,2024/01/05,店,-100,x,y,z,割勘 1:1,0,sj1");

        let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode(&text);
        fs::write(temp_dir.path().join("2024-01.csv"), &encoded).unwrap();
        let sjis = CsvDirectorySource::new(temp_dir.path(), "shift_jis", ColumnMapping::default()).unwrap();
        let table = sjis.load(&DateRange::all()).unwrap();
        assert_eq!(table.rows()[0].memo, "割勘 1:1");

        let mut with_bom = vec![0xEF, 0xBB, 0xBF];
        with_bom.extend_from_slice(text.as_bytes());
        fs::write(temp_dir.path().join("2024-01.csv"), &with_bom).unwrap();
        let table = source(temp_dir.path()).load(&DateRange::all()).unwrap();
        assert_eq!(table.rows()[0].id, "sj1");
    }

    #[test]
    fn test_unknown_encoding() {
        let err = CsvDirectorySource::new("data", "no-such-charset", ColumnMapping::default()).unwrap_err();
        assert!(matches!(err, SplitError::SourceRead(_)));
    }
}
