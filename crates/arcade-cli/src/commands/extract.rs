//! Extract command implementation

use colored::Colorize;

use super::{SyncArgs, open_engine, print_report};
use crate::error::Result;

/// Run the extract command
///
/// Writes every rule of the database into the repository layout.
pub fn run_extract(args: &SyncArgs) -> Result<()> {
    let (engine, level) = open_engine(args)?;

    if args.options.dry_run {
        println!("{} Dry run, nothing will be written", "=>".blue().bold());
    }

    let report = engine.extract()?;
    print_report(&report, level);

    println!("{} Extraction finished", "OK".green().bold());
    Ok(())
}
