//! billsplit - shared expense reconciliation
//!
//! Reads exported personal-finance transactions, selects the ones whose memo
//! flags them for splitting between two parties, computes each party's share
//! from the ratio written after the marker, and merges the result into a
//! per-party ledger kept as sheets of one `.xlsx` workbook. The previous
//! ledger is archived as a dated sheet before every update.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Base directory and settings
//! - `error`: Custom error types
//! - `models`: Amounts, parties, transactions, split markers, ledgers
//! - `source`: Transaction sources (directory of CSV snapshots)
//! - `services`: Extraction, allocation, merging, and the run pipeline
//! - `storage`: Workbook persistence with atomic writes
//! - `audit`: Append-only log of committed runs
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `billsplit` binary
//! - `logging`: Logger bootstrap
//!
//! # Example
//!
//! ```rust,ignore
//! use billsplit::config::{Settings, SplitPaths};
//! use billsplit::models::{Party, SplitMarker};
//! use billsplit::services::SplitPipeline;
//! use billsplit::source::{CsvDirectorySource, DateRange};
//! use billsplit::storage::LedgerStore;
//!
//! let paths = SplitPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let source = CsvDirectorySource::new(settings.source_dir(&paths), "utf-8", settings.columns.clone())?;
//! let store = LedgerStore::new(settings.ledger_file(&paths), "%Y/%m/%d");
//! let marker = SplitMarker::new(&settings.markers)?;
//! let pipeline = SplitPipeline::new(source, store, marker, Party::U1, settings.drop_columns.clone());
//! let outcome = pipeline.run(&DateRange::all(), chrono::Local::now().date_naive())?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod source;
pub mod storage;

pub use error::{SplitError, SplitResult};
