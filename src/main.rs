use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use billsplit::cli::{
    handle_archives_command, handle_history_command, handle_run_command, handle_show_command,
    RunArgs, ShowArgs,
};
use billsplit::config::{Settings, SplitPaths};
use billsplit::logging::init_logging;

#[derive(Parser)]
#[command(
    name = "billsplit",
    version,
    about = "Reconcile shared expenses from transaction exports into a split ledger",
    long_about = "billsplit reads exported transactions, picks out the ones whose memo \
                  carries a split marker and ratio (e.g. \"dinner 割勘 2:1\"), works out \
                  each party's share, and merges them into a per-party ledger sheet, \
                  archiving the previous version first."
)]
struct Cli {
    /// Log level: off, error, warn, info, debug, trace (RUST_LOG wins)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile flagged transactions into a party's ledger
    Run(RunArgs),

    /// Print a party's ledger and totals
    Show {
        #[command(flatten)]
        args: ShowArgs,

        /// Show an archive snapshot instead of the live ledger
        #[arg(short, long)]
        archive: Option<String>,
    },

    /// List a party's archive snapshots, newest first
    Archives(ShowArgs),

    /// Show recently committed runs
    History {
        /// Number of runs to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Write a default config.json
    Init {
        /// Overwrite an existing config.json
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = SplitPaths::new()?;
    let _logger = init_logging(&cli.log_level, Some(paths.log_dir().as_path()))
        .context("Failed to start logging")?;

    match cli.command {
        Some(Commands::Run(args)) => {
            handle_run_command(&paths, &load_settings(&paths)?, args)?;
        }
        Some(Commands::Show { args, archive }) => {
            handle_show_command(&paths, &load_settings(&paths)?, args, archive)?;
        }
        Some(Commands::Archives(args)) => {
            handle_archives_command(&paths, &load_settings(&paths)?, args)?;
        }
        Some(Commands::History { limit }) => {
            handle_history_command(&paths, limit)?;
        }
        Some(Commands::Init { force }) => {
            let settings_file = paths.settings_file();
            if settings_file.exists() && !force {
                println!("Config already exists: {}", settings_file.display());
                println!("Run 'billsplit init --force' to overwrite it with defaults.");
                return Ok(());
            }

            Settings::default().save(&paths)?;
            std::fs::create_dir_all(paths.data_dir())
                .with_context(|| format!("Failed to create {}", paths.data_dir().display()))?;

            println!("Initialized billsplit at: {}", paths.base_dir().display());
            println!("Config written to: {}", settings_file.display());
            println!();
            println!(
                "Put exported CSV snapshots in {} and run 'billsplit run'.",
                paths.data_dir().display()
            );
        }
        Some(Commands::Config) => {
            let settings = load_settings(&paths)?;
            println!("billsplit Configuration");
            println!("=======================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Config file:      {}", paths.settings_file().display());
            println!("Source directory: {}", settings.source_dir(&paths).display());
            println!("Ledger workbook:  {}", settings.ledger_file(&paths).display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!("Log directory:    {}", paths.log_dir().display());
            println!();
            println!("Settings:");
            println!(
                "{}",
                serde_json::to_string_pretty(&settings).context("Failed to render settings")?
            );
        }
        None => {
            println!("billsplit - shared expense reconciliation");
            println!();
            println!("Run 'billsplit --help' for usage information.");
            println!("Run 'billsplit run' to reconcile the configured party.");
        }
    }

    Ok(())
}

fn load_settings(paths: &SplitPaths) -> Result<Settings> {
    Settings::load_or_create(paths)
        .with_context(|| format!("Failed to load {}", paths.settings_file().display()))
}
