//! [`TestRepo`] builder for rule repository test scenarios.

use std::fs;
use std::path::Path;

use arcade_core::Rule;
use arcade_core::model::RuleConfig;
use arcade_fs::NormalizedPath;
use tempfile::TempDir;

/// A temporary rule repository with helper methods for test setup and
/// assertion.
///
/// # Example
///
/// ```rust,no_run
/// use arcade_test_utils::{TestRepo, calculation};
///
/// let repo = TestRepo::new();
/// repo.write_rule("Parcels", &calculation(1, "Area"));
/// repo.assert_file_exists("Parcels/Area/config.json");
/// ```
pub struct TestRepo {
    temp_dir: TempDir,
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRepo {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The root as a [`NormalizedPath`].
    pub fn path(&self) -> NormalizedPath {
        NormalizedPath::new(self.root())
    }

    /// Write `content` to `path` (relative to root), creating parents.
    pub fn write_file(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", full_path.display()));
    }

    /// Read the file at `path` (relative to root).
    pub fn read_file(&self, path: &str) -> String {
        let full_path = self.root().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Write a rule folder for `rule` below `dataset_dir` (`""` for the
    /// root), with a `.js` script named after the rule.
    pub fn write_rule(&self, dataset_dir: &str, rule: &Rule) {
        let folder = if dataset_dir.is_empty() {
            rule.name.clone()
        } else {
            format!("{dataset_dir}/{}", rule.name)
        };
        let config = serde_json::to_string_pretty(&RuleConfig::from(rule)).unwrap();
        self.write_file(&format!("{folder}/config.json"), &config);
        self.write_file(&format!("{folder}/{}.js", rule.name), &rule.script_expression);
    }

    /// Create an empty dataset directory.
    pub fn create_dir(&self, path: &str) {
        fs::create_dir_all(self.root().join(path)).unwrap();
    }

    /// Write `.arcade/config.toml`.
    pub fn write_config(&self, content: &str) {
        self.write_file(".arcade/config.toml", content);
    }

    /// Assert that `path` (relative to the repo root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the repo root) does **not** exist.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read_file(path);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            path,
            content,
            file_content
        );
    }
}
