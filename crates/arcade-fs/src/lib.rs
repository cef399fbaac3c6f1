//! Filesystem abstraction for Arcade Manager
//!
//! Provides normalized path handling, rule-tree directory listing and
//! safe I/O operations used by the extraction and commit flows.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::ArcadePath;
pub use error::{Error, Result};
pub use io::{DirEntry, EntryKind};
pub use path::{ILLEGAL_COMPONENT_CHARS, NormalizedPath, Sanitized, sanitize_component};
