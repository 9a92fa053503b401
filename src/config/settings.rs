//! User settings for billsplit
//!
//! Everything a run needs to know: which memo markers flag a split, which
//! party is reconciling, which export columns to read and which to drop, and
//! where the exports and the ledger workbook live.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::SplitPaths;
use crate::error::SplitError;
use crate::models::{check_date_format, Party};
use crate::source::ColumnMapping;

/// User settings for billsplit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Equivalent memo literals that flag a transaction for splitting
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,

    /// Party whose export is being reconciled
    #[serde(default)]
    pub party: Party,

    /// Passthrough columns removed from allocated rows
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,

    /// Export column headers
    #[serde(default)]
    pub columns: ColumnMapping,

    /// Character encoding of the export files (an encoding_rs label)
    #[serde(default = "default_encoding")]
    pub source_encoding: String,

    /// Export directory; defaults to `data/` under the base directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,

    /// Ledger workbook; defaults to `output/bill_splitting.xlsx`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_file: Option<PathBuf>,

    /// Format used when writing ledger dates (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_markers() -> Vec<String> {
    vec!["割勘".to_string(), "割り勘".to_string()]
}

fn default_drop_columns() -> Vec<String> {
    vec![
        "計算対象".to_string(),
        "保有金融機関".to_string(),
        "振替".to_string(),
    ]
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_date_format() -> String {
    "%Y/%m/%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            markers: default_markers(),
            party: Party::default(),
            drop_columns: default_drop_columns(),
            columns: ColumnMapping::default(),
            source_encoding: default_encoding(),
            source_dir: None,
            ledger_file: None,
            date_format: default_date_format(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &SplitPaths) -> Result<Self, SplitError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| SplitError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                SplitError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SplitPaths) -> Result<(), SplitError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| SplitError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| SplitError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> Result<(), SplitError> {
        if self.markers.iter().all(|m| m.trim().is_empty()) {
            return Err(SplitError::Config(
                "at least one non-empty split marker is required".into(),
            ));
        }
        if encoding_rs::Encoding::for_label(self.source_encoding.as_bytes()).is_none() {
            return Err(SplitError::Config(format!(
                "unknown source encoding '{}'",
                self.source_encoding
            )));
        }
        check_date_format(&self.date_format)?;
        Ok(())
    }

    /// Export directory, resolved against the base directory
    pub fn source_dir(&self, paths: &SplitPaths) -> PathBuf {
        match &self.source_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => paths.base_dir().join(dir),
            None => paths.data_dir(),
        }
    }

    /// Ledger workbook, resolved against the base directory
    pub fn ledger_file(&self, paths: &SplitPaths) -> PathBuf {
        match &self.ledger_file {
            Some(file) if file.is_absolute() => file.clone(),
            Some(file) => paths.base_dir().join(file),
            None => paths.ledger_file(),
        }
    }
}
