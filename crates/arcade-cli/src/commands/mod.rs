//! Command implementations for arcade-cli

pub mod commit;
pub mod extract;
pub mod init;

pub use commit::run_commit;
pub use extract::run_extract;
pub use init::run_init;

use std::path::PathBuf;

use colored::Colorize;

use arcade_core::{JsonStore, ManagerConfig, Severity, SyncEngine, SyncOptions, SyncReport};
use arcade_fs::NormalizedPath;

use crate::error::{CliError, Result};

/// Arguments shared by `extract` and `commit`
#[derive(Debug, Clone, Default)]
pub struct SyncArgs {
    pub repository: PathBuf,
    pub database: Option<PathBuf>,
    pub target: Option<String>,
    pub options: SyncOptions,
}

/// Open the database and build an engine over the repository.
///
/// Returns the engine and the configured report level.
fn open_engine(args: &SyncArgs) -> Result<(SyncEngine<JsonStore>, Severity)> {
    let repository = NormalizedPath::new(&args.repository);
    let config = ManagerConfig::load(&repository)?;
    let level = config.report_level()?;

    let database = args
        .database
        .as_ref()
        .map(NormalizedPath::new)
        .or_else(|| config.database(&repository))
        .ok_or_else(|| {
            CliError::user("No database given. Pass --database or set `database` in .arcade/config.toml")
        })?;
    if !database.is_file() {
        return Err(CliError::user(format!("Database not found: {}", database)));
    }

    let store = JsonStore::open(&database)?;
    let target = args
        .target
        .as_deref()
        .map(NormalizedPath::new)
        .unwrap_or_default();

    let engine = SyncEngine::with_config(store, repository, config)
        .with_options(args.options)
        .with_target(target);
    Ok((engine, level))
}

/// Print actions and the diagnostics at or above `level`.
fn print_report(report: &SyncReport, level: Severity) {
    for action in &report.actions {
        println!("   {} {}", "+".green(), action);
    }
    for diagnostic in report.diagnostics_at(level) {
        let label = match diagnostic.severity {
            Severity::Info => diagnostic.severity.as_str().blue().bold(),
            Severity::Warning => diagnostic.severity.as_str().yellow().bold(),
            Severity::Error => diagnostic.severity.as_str().red().bold(),
        };
        println!("{} {}", label, diagnostic.message);
    }
}
