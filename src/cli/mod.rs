//! CLI command handlers
//!
//! Bridges clap argument parsing with the pipeline and the ledger store.

pub mod ledger;
pub mod run;

pub use ledger::{handle_archives_command, handle_history_command, handle_show_command, ShowArgs};
pub use run::{handle_run_command, RunArgs};

use crate::config::{Settings, SplitPaths};
use crate::error::SplitResult;
use crate::models::Party;

/// Resolve an optional `--party` flag against the configured party
pub(crate) fn resolve_party(flag: Option<&str>, settings: &Settings) -> SplitResult<Party> {
    match flag {
        Some(label) => label.parse(),
        None => Ok(settings.party),
    }
}

/// Ledger workbook from a `--ledger` override or the settings
pub(crate) fn resolve_ledger(
    flag: Option<&std::path::Path>,
    settings: &Settings,
    paths: &SplitPaths,
) -> std::path::PathBuf {
    flag.map(|p| p.to_path_buf())
        .unwrap_or_else(|| settings.ledger_file(paths))
}
