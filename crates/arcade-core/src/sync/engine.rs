//! SyncEngine implementation
//!
//! The SyncEngine drives one run between a backing store and a rule
//! repository: `extract` writes the store's rules to disk, `commit`
//! reconciles the store against the repository.

use arcade_fs::constants::is_hidden;
use arcade_fs::{NormalizedPath, io};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::build::{from_file_tree, from_store};
use crate::config::ManagerConfig;
use crate::reconcile::{ReconcileSummary, Reconciler};
use crate::report::{Diagnostic, Diagnostics, Severity};
use crate::store::BackingStore;

/// Report from an extract or commit run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    /// Actions taken (or, in a dry run, planned) in order
    pub actions: Vec<String>,
    /// Reconciliation counts; all zero for an extract
    pub summary: ReconcileSummary,
    /// Every diagnostic of the run in emission order
    pub diagnostics: Vec<Diagnostic>,
}

impl SyncReport {
    /// Diagnostics at or above `level`.
    pub fn diagnostics_at(&self, level: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.severity >= level)
    }

    /// Whether any per-rule failure was recovered during the run.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

/// Options for extract and commit runs
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// If true, decide everything but neither mutate the store nor write
    /// files. Actions will be prefixed with "[dry-run] Would ..."
    pub dry_run: bool,
    /// Remove every non-hidden top-level repository entry before extracting
    pub clean: bool,
}

/// Engine for synchronizing a backing store with a rule repository
pub struct SyncEngine<S: BackingStore> {
    store: S,
    repository: NormalizedPath,
    /// Container address the repository root corresponds to
    target: NormalizedPath,
    config: ManagerConfig,
    options: SyncOptions,
}

impl<S: BackingStore> SyncEngine<S> {
    /// Create an engine, loading the repository's tool configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `.arcade/config.toml` exists but cannot be parsed.
    pub fn new(store: S, repository: NormalizedPath) -> Result<Self> {
        let config = ManagerConfig::load(&repository)?;
        Ok(Self::with_config(store, repository, config))
    }

    pub fn with_config(store: S, repository: NormalizedPath, config: ManagerConfig) -> Self {
        Self {
            store,
            repository,
            target: NormalizedPath::root(),
            config,
            options: SyncOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Synchronize only the subtree below `target`.
    pub fn with_target(mut self, target: NormalizedPath) -> Self {
        self.target = target;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Write the backing store's rules to the repository.
    ///
    /// # Errors
    ///
    /// Construction and filesystem errors abort the run.
    pub fn extract(&self) -> Result<SyncReport> {
        let mut diagnostics = Diagnostics::new();
        let mut actions = Vec::new();

        let tree = from_store(&self.store, &self.target)?;
        tracing::debug!(rules = tree.rule_count(), "Built tree from store");
        tree.root.check_folder_names()?;

        if self.options.clean {
            self.clean(&mut actions)?;
        }

        let write_options = self.config.write_options(self.options.dry_run);
        tree.root
            .write_file_tree(&self.repository, &write_options, &mut diagnostics, &mut actions)?;

        diagnostics.info(format!(
            "Extracted rules from {} to {}",
            self.store.name(),
            self.repository
        ));

        Ok(SyncReport {
            actions,
            summary: ReconcileSummary::default(),
            diagnostics: diagnostics.into_vec(),
        })
    }

    /// Make the backing store match the repository.
    ///
    /// # Errors
    ///
    /// Construction errors abort the run before the store is touched.
    /// Rejected mutations are reported in the returned diagnostics instead.
    pub fn commit(&mut self) -> Result<SyncReport> {
        let mut diagnostics = Diagnostics::new();

        let desired = from_file_tree(&self.repository, &self.target)?;
        let current = from_store(&self.store, &self.target)?;
        tracing::debug!(
            desired = desired.rule_count(),
            current = current.rule_count(),
            "Built trees for commit"
        );

        let outcome = Reconciler::new(&mut self.store)
            .dry_run(self.options.dry_run)
            .run(&desired, &current.index, &mut diagnostics);

        diagnostics.info(format!("Commit to {} complete", self.store.name()));

        Ok(SyncReport {
            actions: outcome.actions,
            summary: outcome.summary,
            diagnostics: diagnostics.into_vec(),
        })
    }

    /// Remove stale top-level entries; hidden entries (`.git`, `.arcade`) stay.
    fn clean(&self, actions: &mut Vec<String>) -> Result<()> {
        if !self.repository.is_dir() {
            return Ok(());
        }

        for entry in io::list_dir(&self.repository)? {
            if is_hidden(&entry.name) {
                continue;
            }
            if self.options.dry_run {
                actions.push(format!("[dry-run] Would remove {}", entry.path));
            } else {
                io::remove_all(&entry.path)?;
                actions.push(format!("Removed {}", entry.path));
            }
        }
        Ok(())
    }
}
