//! Backup Catalog - Main entry point
//!
//! Lists installed applications with their backup state, exports the catalog
//! as a bundle and edits the list's sort/filter preferences.

use anyhow::{Context, Result};
use backup_catalog::catalog::{self, bundle, format::format_record_line};
use backup_catalog::history::scan::scan_logs;
use backup_catalog::prefs::{
    BackupFilter, FilterContext, InstallFilter, SortBy, SortFilterModel, SpecialFilter,
    TomlFileStore,
};
use backup_catalog::{utils, AppRecord, Config};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the catalog using the saved sort/filter preferences
    List {
        /// Installed-apps inventory (overrides config)
        #[arg(long, value_name = "FILE")]
        inventory: Option<PathBuf>,

        /// Backup directory to scan for logs (overrides config)
        #[arg(long, value_name = "DIR")]
        backups: Option<PathBuf>,

        /// Ignore saved preferences and list everything by package name
        #[arg(long)]
        all: bool,
    },

    /// Write the full catalog to a compressed bundle
    Export {
        #[arg(long, value_name = "FILE")]
        inventory: Option<PathBuf>,

        #[arg(long, value_name = "DIR")]
        backups: Option<PathBuf>,

        /// Output file (overrides config)
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Print the records stored in a bundle
    Inspect {
        /// Bundle file
        file: PathBuf,
    },

    /// Show or change the sort/filter preferences
    Filter {
        #[command(subcommand)]
        action: FilterAction,
    },
}

#[derive(Subcommand, Debug)]
enum FilterAction {
    /// Print the saved preferences
    Show,

    /// Change some choices and save
    Set {
        #[arg(long, value_enum)]
        sort: Option<SortBy>,

        #[arg(long, value_enum)]
        filter: Option<InstallFilter>,

        #[arg(long, value_enum)]
        backup: Option<BackupFilter>,

        #[arg(long, value_enum)]
        special: Option<SpecialFilter>,
    },

    /// Restore the defaults
    Reset,
}

fn load_catalog(
    config: &Config,
    inventory: Option<PathBuf>,
    backups: Option<PathBuf>,
) -> Result<Vec<AppRecord>> {
    let inventory_path = inventory.unwrap_or_else(|| config.catalog.inventory.clone());
    let backup_dir = backups.unwrap_or_else(|| config.catalog.backup_dir.clone());

    let apps = catalog::load_inventory(&inventory_path)
        .with_context(|| format!("reading inventory {}", inventory_path.display()))?;
    let logs = scan_logs(&backup_dir)
        .with_context(|| format!("scanning backups in {}", backup_dir.display()))?;

    Ok(catalog::build_catalog(apps, logs))
}

fn print_records(records: &[AppRecord]) {
    for record in records {
        println!("{}", format_record_line(record));
    }
}

fn open_preferences(path: &Path) -> Result<TomlFileStore> {
    TomlFileStore::open(path).with_context(|| format!("opening preferences {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = if let Some(config_path) = &args.config {
        Config::from_file(config_path)
            .with_context(|| format!("loading config {}", config_path.display()))?
    } else {
        Config::default()
    };

    // Initialize logging
    let log_level = args.log_level.as_deref().unwrap_or(&config.log.level);
    utils::logger::init(log_level)?;

    tracing::debug!("Starting backup-catalog v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::List {
            inventory,
            backups,
            all,
        } => {
            let records = load_catalog(&config, inventory, backups)?;
            let records = if all {
                records
            } else {
                let store = open_preferences(&config.preferences.path)?;
                let model = SortFilterModel::load(&store)?;
                tracing::info!("Applying {}", model);
                let ctx = FilterContext::new(config.filters.old_backup_days)?;
                model.apply(records, &ctx)
            };
            print_records(&records);
        }

        Command::Export {
            inventory,
            backups,
            out,
        } => {
            let records = load_catalog(&config, inventory, backups)?;
            let out = out.unwrap_or_else(|| config.catalog.bundle.clone());
            bundle::write_bundle(&out, &records)
                .await
                .with_context(|| format!("writing bundle {}", out.display()))?;
            println!("Exported {} record(s) to {}", records.len(), out.display());
        }

        Command::Inspect { file } => {
            let records = bundle::read_bundle(&file)
                .await
                .with_context(|| format!("reading bundle {}", file.display()))?;
            print_records(&records);
        }

        Command::Filter { action } => {
            let mut store = open_preferences(&config.preferences.path)?;
            let model = match action {
                FilterAction::Show => SortFilterModel::load(&store)?,
                FilterAction::Set {
                    sort,
                    filter,
                    backup,
                    special,
                } => {
                    let mut model = SortFilterModel::load(&store)?;
                    model.sort_by = sort.unwrap_or(model.sort_by);
                    model.filter = filter.unwrap_or(model.filter);
                    model.backup_filter = backup.unwrap_or(model.backup_filter);
                    model.special_filter = special.unwrap_or(model.special_filter);
                    model.save(&mut store)?;
                    model
                }
                FilterAction::Reset => SortFilterModel::reset(&mut store)?,
            };
            println!("{}", model);
        }
    }

    Ok(())
}
