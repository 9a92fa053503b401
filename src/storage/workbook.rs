//! In-memory workbook with atomic persistence
//!
//! The ledger container is an `.xlsx` file. It is read whole with calamine,
//! edited in memory, and written whole with rust_xlsxwriter to a temporary
//! sibling that is renamed over the original. A crash mid-write leaves the
//! previous file intact. Formulas, date-times and error cells on sheets the
//! store does not own are written back as such, not as their values.

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{Duration, NaiveDate};
use rust_xlsxwriter::{Format, Formula, Workbook as XlsxWorkbook};

use crate::error::{SplitError, SplitResult};

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel 1900-system serial shown as a date or date-time
    DateTime(f64),
    /// Error value such as `#N/A`
    Error(String),
    /// Formula text (no leading `=`) and its last cached value
    Formula { formula: String, value: Box<Cell> },
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn formula(formula: impl Into<String>, value: Cell) -> Self {
        let formula = formula.into();
        Cell::Formula {
            formula: formula.trim_start_matches('=').to_string(),
            value: Box::new(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the cell as text; whole numbers lose their trailing ".0"
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) | Cell::Error(s) => s.clone(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => format!("{}", n),
            Cell::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Cell::DateTime(serial) => match serial_to_date(*serial) {
                Some(date) => date.format("%Y/%m/%d").to_string(),
                None => Cell::Number(*serial).as_text(),
            },
            Cell::Formula { value, .. } => value.as_text(),
        }
    }

    /// Numeric value, parsing text cells if needed
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) | Cell::DateTime(n) => Some(*n),
            Cell::Text(s) => s.trim().replace(',', "").parse().ok(),
            Cell::Formula { value, .. } => value.as_number(),
            Cell::Bool(_) | Cell::Empty | Cell::Error(_) => None,
        }
    }

    /// Boolean value; text accepts TRUE/FALSE in any case, and 1/0
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            Cell::Number(n) => Some(*n != 0.0),
            Cell::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" | "" => Some(false),
                _ => None,
            },
            Cell::Formula { value, .. } => value.as_bool(),
            Cell::Empty => Some(false),
            Cell::DateTime(_) | Cell::Error(_) => None,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(n) => Cell::Number(*n),
            Data::Int(n) => Cell::Number(*n as f64),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) if dt.is_duration() => Cell::Number(dt.as_f64()),
            Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Error(e.to_string()),
        }
    }
}

/// Convert an Excel 1900-system serial to a date
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// A named grid of cells; row 0 is the header
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Header row as text
    pub fn headers(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|r| r.iter().map(|c| c.as_text().trim().to_string()).collect())
            .unwrap_or_default()
    }

    /// Data rows (everything after the header)
    pub fn data_rows(&self) -> &[Vec<Cell>] {
        if self.rows.is_empty() {
            &[]
        } else {
            &self.rows[1..]
        }
    }
}

/// Every sheet of a workbook file, in tab order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a workbook, returning an empty one if the file doesn't exist
    pub fn open<P: AsRef<Path>>(path: P) -> SplitResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }

        let mut xlsx: Sheets<_> = open_workbook_auto(path).map_err(|e| {
            SplitError::Storage(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let mut sheets = Vec::new();
        for name in xlsx.sheet_names().to_vec() {
            let range = xlsx.worksheet_range(&name).map_err(|e| {
                SplitError::Storage(format!("Failed to read sheet '{}': {}", name, e))
            })?;

            // Ranges start at the first used cell; pad back to A1
            let (start_row, start_col) = range.start().unwrap_or((0, 0));
            let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row as usize];
            for data_row in range.rows() {
                let mut row = vec![Cell::Empty; start_col as usize];
                row.extend(data_row.iter().map(Cell::from));
                rows.push(row);
            }

            let formulas = xlsx.worksheet_formula(&name).map_err(|e| {
                SplitError::Storage(format!("Failed to read formulas of '{}': {}", name, e))
            })?;
            let (f_row, f_col) = formulas.start().unwrap_or((0, 0));
            for (r, c, formula) in formulas.cells() {
                if formula.is_empty() {
                    continue;
                }
                let (r, c) = (f_row as usize + r, f_col as usize + c);
                if rows.len() <= r {
                    rows.resize(r + 1, Vec::new());
                }
                if rows[r].len() <= c {
                    rows[r].resize(c + 1, Cell::Empty);
                }
                let value = std::mem::replace(&mut rows[r][c], Cell::Empty);
                rows[r][c] = Cell::formula(formula.as_str(), value);
            }

            sheets.push(Sheet { name, rows });
        }

        Ok(Self { sheets })
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Add a sheet that must not already exist
    pub fn insert_new(&mut self, sheet: Sheet) -> SplitResult<()> {
        if self.contains(&sheet.name) {
            return Err(SplitError::NameCollision(sheet.name));
        }
        self.sheets.push(sheet);
        Ok(())
    }

    /// Replace a sheet in place, or append it if it is new
    pub fn replace(&mut self, sheet: Sheet) {
        match self.sheets.iter_mut().find(|s| s.name == sheet.name) {
            Some(existing) => *existing = sheet,
            None => self.sheets.push(sheet),
        }
    }

    /// Write the whole workbook atomically (write to temp, then rename)
    pub fn write_atomic<P: AsRef<Path>>(&self, path: P) -> SplitResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                SplitError::Storage(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp_path = temp_path_for(path);

        let date_format = Format::new().set_num_format("yyyy/mm/dd");
        let datetime_format = Format::new().set_num_format("yyyy/mm/dd hh:mm:ss");

        let mut xlsx = XlsxWorkbook::new();
        for sheet in &self.sheets {
            let worksheet = xlsx.add_worksheet().set_name(&sheet.name).map_err(|e| {
                SplitError::Storage(format!("Failed to create sheet '{}': {}", sheet.name, e))
            })?;

            for (r, row) in sheet.rows.iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    let (row32, col16) = (r as u32, c as u16);
                    let written = match cell {
                        Cell::Empty => continue,
                        Cell::Text(s) => worksheet.write_string(row32, col16, s).map(|_| ()),
                        Cell::Number(n) => worksheet.write_number(row32, col16, *n).map(|_| ()),
                        Cell::Bool(b) => worksheet.write_boolean(row32, col16, *b).map(|_| ()),
                        Cell::DateTime(serial) => {
                            let format = if serial.fract() == 0.0 {
                                &date_format
                            } else {
                                &datetime_format
                            };
                            worksheet
                                .write_number_with_format(row32, col16, *serial, format)
                                .map(|_| ())
                        }
                        // Error literals are valid formulas
                        Cell::Error(e) => worksheet
                            .write_formula(row32, col16, Formula::new(e))
                            .map(|_| ()),
                        Cell::Formula { formula, value } => {
                            let mut formula = Formula::new(formula);
                            // Only numeric results can be cached untyped
                            if let Cell::Number(n) = value.as_ref() {
                                formula = formula.set_result(n.to_string());
                            }
                            worksheet.write_formula(row32, col16, formula).map(|_| ())
                        }
                    };
                    written.map_err(|e| {
                        SplitError::Storage(format!(
                            "Failed to write cell ({}, {}) of '{}': {}",
                            r, c, sheet.name, e
                        ))
                    })?;
                }
            }
        }

        if let Err(e) = xlsx.save(&temp_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(SplitError::Storage(format!("Failed to write workbook: {}", e)));
        }

        fs::rename(&temp_path, path).map_err(|e| {
            // Try to clean up temp file if rename fails
            let _ = fs::remove_file(&temp_path);
            SplitError::Storage(format!("Failed to rename temp file: {}", e))
        })?;

        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
