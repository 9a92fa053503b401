//! `show`, `archives` and `history`: read-only views of the workbook

use std::path::PathBuf;

use clap::Args;

use crate::audit::AuditLogger;
use crate::config::{Settings, SplitPaths};
use crate::display::{format_archive_list, format_ledger};
use crate::error::SplitResult;
use crate::storage::LedgerStore;

use super::{resolve_ledger, resolve_party};

/// Arguments shared by `show` and `archives`
#[derive(Args, Debug, Default, Clone)]
pub struct ShowArgs {
    /// Party whose ledger to read (U1 or U2)
    #[arg(short, long)]
    pub party: Option<String>,

    /// Ledger workbook to read
    #[arg(short, long)]
    pub ledger: Option<PathBuf>,
}

impl ShowArgs {
    fn store(&self, paths: &SplitPaths, settings: &Settings) -> LedgerStore {
        LedgerStore::new(
            resolve_ledger(self.ledger.as_deref(), settings, paths),
            settings.date_format.clone(),
        )
    }
}

/// Handle `billsplit show`, optionally for one archive snapshot
pub fn handle_show_command(
    paths: &SplitPaths,
    settings: &Settings,
    args: ShowArgs,
    archive: Option<String>,
) -> SplitResult<()> {
    let party = resolve_party(args.party.as_deref(), settings)?;
    let store = args.store(paths, settings);

    let ledger = match &archive {
        Some(name) => store.load_archive(party, name)?,
        None => store.load(party)?,
    };

    if let Some(name) = &archive {
        println!("Archive {}", name);
        println!();
    }
    print!("{}", format_ledger(&ledger));
    Ok(())
}

/// Handle `billsplit archives`
pub fn handle_archives_command(
    paths: &SplitPaths,
    settings: &Settings,
    args: ShowArgs,
) -> SplitResult<()> {
    let party = resolve_party(args.party.as_deref(), settings)?;
    let archives = args.store(paths, settings).list_archives(party)?;
    print!("{}", format_archive_list(party, &archives));
    Ok(())
}

/// Handle `billsplit history`
pub fn handle_history_command(paths: &SplitPaths, limit: usize) -> SplitResult<()> {
    let records = AuditLogger::new(paths.audit_log()).read_recent(limit)?;

    if records.is_empty() {
        println!("No runs recorded yet.");
        return Ok(());
    }

    for record in &records {
        println!("{}", record.format_human_readable());
    }
    Ok(())
}
