//! Commit command implementation

use colored::Colorize;

use super::{SyncArgs, open_engine, print_report};
use crate::error::Result;

/// Run the commit command
///
/// Reconciles the database against the repository. Rules the database
/// rejects are reported but do not fail the run.
pub fn run_commit(args: &SyncArgs) -> Result<()> {
    let (mut engine, level) = open_engine(args)?;

    if args.options.dry_run {
        println!("{} Dry run, the database will not be changed", "=>".blue().bold());
    }

    let report = engine.commit()?;
    print_report(&report, level);

    let summary = &report.summary;
    let counts = format!(
        "{} skipped, {} inserted, {} updated, {} deleted, {} failed",
        summary.skipped, summary.inserted, summary.updated, summary.deleted, summary.failed
    );
    if report.has_errors() {
        println!("{} {}", "DONE WITH ERRORS".yellow().bold(), counts);
    } else {
        println!("{} {}", "OK".green().bold(), counts);
    }
    Ok(())
}
