//! `run`: reconcile one party's ledger against the exports

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Args;
use log::info;

use crate::audit::AuditLogger;
use crate::config::{Settings, SplitPaths};
use crate::display::format_run_outcome;
use crate::error::{SplitError, SplitResult};
use crate::models::SplitMarker;
use crate::services::{RunOutcome, SplitPipeline};
use crate::source::{CsvDirectorySource, DateRange};
use crate::storage::LedgerStore;

use super::{resolve_ledger, resolve_party};

/// Arguments for `billsplit run`; each overrides the matching setting
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Acting party (U1 or U2)
    #[arg(short, long)]
    pub party: Option<String>,

    /// Split marker literal; repeat for several (replaces the configured ones)
    #[arg(short, long = "marker")]
    pub markers: Vec<String>,

    /// Directory of exported CSV snapshots
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Ledger workbook to update
    #[arg(short, long)]
    pub ledger: Option<PathBuf>,

    /// Character encoding of the exports (e.g. utf-8, shift_jis)
    #[arg(short, long)]
    pub encoding: Option<String>,

    /// First month to read (YYYY-MM)
    #[arg(long)]
    pub from: Option<String>,

    /// Last month to read (YYYY-MM)
    #[arg(long)]
    pub to: Option<String>,
}

impl RunArgs {
    /// Months selected by `--from`/`--to`
    pub fn range(&self) -> SplitResult<DateRange> {
        let from = self.from.as_deref().map(DateRange::parse_month).transpose()?;
        let to = self.to.as_deref().map(DateRange::parse_month).transpose()?;

        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(SplitError::Config(format!(
                    "--from {} is after --to {}",
                    from.format("%Y-%m"),
                    to.format("%Y-%m")
                )));
            }
        }

        Ok(DateRange::months(from, to))
    }
}

/// Handle `billsplit run`
pub fn handle_run_command(
    paths: &SplitPaths,
    settings: &Settings,
    args: RunArgs,
) -> SplitResult<RunOutcome> {
    run_on(paths, settings, args, Local::now().date_naive())
}

fn run_on(
    paths: &SplitPaths,
    settings: &Settings,
    args: RunArgs,
    today: NaiveDate,
) -> SplitResult<RunOutcome> {
    let party = resolve_party(args.party.as_deref(), settings)?;
    let range = args.range()?;

    let marker = if args.markers.is_empty() {
        SplitMarker::new(settings.markers.as_slice())?
    } else {
        SplitMarker::new(args.markers.as_slice())?
    };

    let source_dir = args
        .source
        .clone()
        .unwrap_or_else(|| settings.source_dir(paths));
    let encoding = args
        .encoding
        .as_deref()
        .unwrap_or(&settings.source_encoding);
    let ledger_file = resolve_ledger(args.ledger.as_deref(), settings, paths);

    info!(
        "Source {} ({}), markers {:?}",
        source_dir.display(),
        encoding,
        marker.literals()
    );

    let source = CsvDirectorySource::new(source_dir, encoding, settings.columns.clone())?;
    let store = LedgerStore::new(ledger_file, settings.date_format.clone());

    let pipeline = SplitPipeline::new(source, store, marker, party, settings.drop_columns.clone())
        .with_audit(AuditLogger::new(paths.audit_log()));

    let outcome = pipeline.run(&range, today)?;
    print!("{}", format_run_outcome(&outcome));

    Ok(outcome)
}
