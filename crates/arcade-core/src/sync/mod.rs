//! SyncEngine for moving rules between a backing store and a repository
//!
//! This module provides:
//! - **extract**: write the store's rule tree to the repository
//! - **commit**: reconcile the store against the repository

mod engine;

pub use engine::{SyncEngine, SyncOptions, SyncReport};
