//! Atomic I/O operations with file locking, and rule-tree directory listing

use std::fs::{self, OpenOptions};
use std::io::Write;
use fs2::FileExt;
use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock to prevent concurrent access.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    // Ensure parent directory exists
    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Temp file in the same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.lock_exclusive()
        .map_err(|_| Error::LockFailed { path: native_path.clone() })?;

    temp_file.write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock()
        .map_err(|_| Error::LockFailed { path: native_path.clone() })?;

    fs::rename(&temp_path, &native_path)
        .map_err(|e| Error::io(&native_path, e))?;

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path)
        .map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Create a directory and all of its parents.
pub fn create_dir_all(path: &NormalizedPath) -> Result<()> {
    let native_path = path.to_native();
    fs::create_dir_all(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Remove a file or a whole directory tree.
pub fn remove_all(path: &NormalizedPath) -> Result<()> {
    let native_path = path.to_native();
    let result = if native_path.is_dir() {
        fs::remove_dir_all(&native_path)
    } else {
        fs::remove_file(&native_path)
    };
    result.map_err(|e| Error::io(&native_path, e))
}

/// Copy a single file, creating the destination directory when needed.
pub fn copy_file(from: &NormalizedPath, to: &NormalizedPath) -> Result<()> {
    if let Some(parent) = to.parent()
        && !parent.is_root()
    {
        create_dir_all(&parent)?;
    }
    fs::copy(from.to_native(), to.to_native())
        .map(|_| ())
        .map_err(|e| Error::io(to.to_native(), e))
}

/// Kind of a directory entry as seen by the rule tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks to nowhere, sockets and other special files
    Other,
}

/// A single entry returned by [`list_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: NormalizedPath,
    pub kind: EntryKind,
}

/// List the entries of a directory sorted by name.
///
/// Sorting keeps tree construction deterministic across platforms.
pub fn list_dir(path: &NormalizedPath) -> Result<Vec<DirEntry>> {
    let native_path = path.to_native();
    let mut entries = Vec::new();

    for entry in fs::read_dir(&native_path).map_err(|e| Error::io(&native_path, e))? {
        let entry = entry.map_err(|e| Error::io(&native_path, e))?;
        let name = entry.file_name().to_string_lossy().to_string();
        let entry_path = path.join(&name);
        // Follow symlinks so a linked rule folder behaves like a real one
        let kind = match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_dir() => EntryKind::Dir,
            Ok(meta) if meta.is_file() => EntryKind::File,
            _ => EntryKind::Other,
        };
        entries.push(DirEntry {
            name,
            path: entry_path,
            kind,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
