//! Arcade Manager CLI
//!
//! Moves attribute rules between a database document and a rule repository.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use arcade_core::SyncOptions;
use cli::{Cli, Mode};
use commands::SyncArgs;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!(mode = ?cli.mode, "Starting");

    match cli.mode {
        Mode::Extract => commands::run_extract(&sync_args(&cli)?),
        Mode::Commit => commands::run_commit(&sync_args(&cli)?),
        Mode::Init => {
            let toolbox = cli
                .toolbox
                .as_deref()
                .ok_or_else(|| CliError::user("init requires --toolbox"))?;
            commands::run_init(toolbox, cli.dry_run)
        }
    }
}

fn sync_args(cli: &Cli) -> Result<SyncArgs> {
    let repository = cli
        .repo
        .clone()
        .ok_or_else(|| CliError::user(format!("{:?} requires --repo", cli.mode).to_lowercase()))?;

    Ok(SyncArgs {
        repository,
        database: cli.database.clone(),
        target: cli.target.clone(),
        options: SyncOptions {
            dry_run: cli.dry_run,
            clean: cli.clean,
        },
    })
}
