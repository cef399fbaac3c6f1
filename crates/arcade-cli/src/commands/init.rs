//! Init command implementation

use std::path::Path;

use colored::Colorize;

use arcade_fs::{ArcadePath, NormalizedPath, io};

use crate::error::{CliError, Result};

/// Run the init command
///
/// Copies the running executable into `<toolbox>/arcade-manager/`.
pub fn run_init(toolbox: &Path, dry_run: bool) -> Result<()> {
    let executable = std::env::current_exe()?;
    let installed = install_path(&executable, toolbox)?;

    if dry_run {
        println!(
            "{} Would install {} to {}",
            "=>".blue().bold(),
            executable.display(),
            installed.as_str().cyan()
        );
        return Ok(());
    }

    install(&NormalizedPath::new(&executable), &installed)?;
    println!("{} Installed to {}", "OK".green().bold(), installed.as_str().cyan());
    Ok(())
}

/// Destination of `executable` inside `toolbox`.
pub fn install_path(executable: &Path, toolbox: &Path) -> Result<NormalizedPath> {
    let file_name = executable
        .file_name()
        .ok_or_else(|| CliError::user(format!("Not a file: {}", executable.display())))?;

    Ok(NormalizedPath::new(toolbox)
        .join(ArcadePath::InstallDir.as_str())
        .join(&file_name.to_string_lossy()))
}

fn install(source: &NormalizedPath, destination: &NormalizedPath) -> Result<()> {
    tracing::debug!(from = %source, to = %destination, "Installing");
    io::copy_file(source, destination)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_install_copies_into_install_dir() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("arcade.bin");
        fs::write(&source, b"binary").unwrap();
        let toolbox = temp.path().join("toolbox");

        let destination = install_path(&source, &toolbox).unwrap();
        install(&NormalizedPath::new(&source), &destination).unwrap();

        let installed = toolbox.join("arcade-manager").join("arcade.bin");
        assert_eq!(fs::read(installed).unwrap(), b"binary");
    }

    #[test]
    fn test_install_path_needs_a_file_name() {
        assert!(install_path(Path::new("/"), Path::new("/tmp")).is_err());
    }
}
