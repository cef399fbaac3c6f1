//! Shared test utilities for the arcade-manager workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`repo`]: [`TestRepo`] builder for rule repositories on disk
//! - [`store`]: [`RecordingStore`] backing-store double
//! - [`rules`]: rule and schema factories

pub mod repo;
pub mod rules;
pub mod store;

pub use repo::TestRepo;
pub use rules::{calculation, constraint, schema, validation};
pub use store::{RecordingStore, SCRUBBED, StoreCall};
