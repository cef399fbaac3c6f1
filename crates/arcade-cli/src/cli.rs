//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Arcade Manager - Keep attribute rules in step with a rule repository
#[derive(Parser, Debug)]
#[command(name = "arcade")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Operation to run
    #[arg(value_enum)]
    pub mode: Mode,

    /// Database document holding the attribute rules
    #[arg(short, long, env = "ARCADE_DATABASE")]
    pub database: Option<PathBuf>,

    /// Rule repository directory
    #[arg(short, long)]
    pub repo: Option<PathBuf>,

    /// Installation target for `init`
    #[arg(short, long)]
    pub toolbox: Option<PathBuf>,

    /// Container the repository root corresponds to, e.g. `Network/Lines`
    #[arg(long)]
    pub target: Option<String>,

    /// Preview changes without applying them
    #[arg(long)]
    pub dry_run: bool,

    /// Remove stale rule folders before extracting
    #[arg(long)]
    pub clean: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Operation selected on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Write the database's rules to the repository
    Extract,
    /// Make the database match the repository
    Commit,
    /// Install the tool into a toolbox folder
    Init,
}
