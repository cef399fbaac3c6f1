//! Tool configuration
//!
//! An optional `.arcade/config.toml` inside the rule repository:
//!
//! ```toml
//! database = "../gis/parcels.json"
//! script_extension = "arcade"
//! report_level = "WARNING"
//! ```
//!
//! A missing file means defaults for every key. Unknown keys are rejected.

use std::path::PathBuf;

use arcade_fs::{ArcadePath, ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::model::WriteOptions;
use crate::report::Severity;

fn default_script_extension() -> String {
    "js".to_string()
}

fn default_report_level() -> String {
    Severity::Info.as_str().to_string()
}

/// Settings read from `.arcade/config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagerConfig {
    /// Database used when none is given on the command line; relative
    /// paths resolve against the repository root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Extension of extracted script files
    #[serde(default = "default_script_extension")]
    pub script_extension: String,

    /// Lowest severity shown in run summaries
    #[serde(default = "default_report_level")]
    pub report_level: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            database: None,
            script_extension: default_script_extension(),
            report_level: default_report_level(),
        }
    }
}

impl ManagerConfig {
    /// Location of the configuration file for `repository`.
    pub fn path(repository: &NormalizedPath) -> NormalizedPath {
        repository
            .join(ArcadePath::ConfigDir.as_str())
            .join(ArcadePath::ConfigFile.as_str())
    }

    /// Load the configuration of `repository`, falling back to defaults.
    pub fn load(repository: &NormalizedPath) -> Result<Self> {
        let path = Self::path(repository);
        let config: Option<Self> = ConfigStore::new().load_if_exists(&path)?;
        if config.is_some() {
            tracing::debug!(config = %path, "Loaded tool configuration");
        }
        Ok(config.unwrap_or_default())
    }

    /// Parsed `report_level`.
    pub fn report_level(&self) -> Result<Severity> {
        self.report_level.parse()
    }

    /// Script extension without a leading dot.
    pub fn script_extension(&self) -> &str {
        self.script_extension.trim_start_matches('.')
    }

    /// Configured database resolved against `repository`.
    pub fn database(&self, repository: &NormalizedPath) -> Option<NormalizedPath> {
        self.database.as_ref().map(|db| {
            if db.is_absolute() {
                NormalizedPath::new(db)
            } else {
                repository.join_relative(&NormalizedPath::new(db))
            }
        })
    }

    pub fn write_options(&self, dry_run: bool) -> WriteOptions {
        WriteOptions {
            script_extension: self.script_extension().to_string(),
            dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn repo_with(content: &str) -> (TempDir, NormalizedPath) {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".arcade");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), content).unwrap();
        let path = NormalizedPath::new(temp.path());
        (temp, path)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ManagerConfig::load(&NormalizedPath::new(temp.path())).unwrap();

        assert_eq!(config, ManagerConfig::default());
        assert_eq!(config.report_level().unwrap(), Severity::Info);
        assert_eq!(config.script_extension(), "js");
    }

    #[test]
    fn test_load_values() {
        let (_temp, repo) = repo_with(
            r#"
database = "db/parcels.json"
script_extension = ".arcade"
report_level = "warning"
"#,
        );
        let config = ManagerConfig::load(&repo).unwrap();

        assert_eq!(config.script_extension(), "arcade");
        assert_eq!(config.report_level().unwrap(), Severity::Warning);
        assert_eq!(
            config.database(&repo).unwrap(),
            repo.join("db").join("parcels.json")
        );
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let (_temp, repo) = repo_with("colour = \"red\"\n");
        assert!(ManagerConfig::load(&repo).is_err());
    }

    #[test]
    fn test_bad_report_level() {
        let (_temp, repo) = repo_with("report_level = \"LOUD\"\n");
        let config = ManagerConfig::load(&repo).unwrap();
        assert!(matches!(config.report_level(), Err(Error::InvalidSeverity { .. })));
    }
}
