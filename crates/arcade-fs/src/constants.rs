//! Well-known names in a rule repository.

use std::path::Path;

/// Fixed file and directory names of the on-disk rule layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcadePath {
    /// The `config.json` document inside every rule folder
    RuleConfig,
    /// The `.arcade` directory (tool configuration root)
    ConfigDir,
    /// The `config.toml` file inside `.arcade`
    ConfigFile,
    /// Installation folder created by `init` inside the toolbox location
    InstallDir,
}

impl ArcadePath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RuleConfig => "config.json",
            Self::ConfigDir => ".arcade",
            Self::ConfigFile => "config.toml",
            Self::InstallDir => "arcade-manager",
        }
    }
}

impl AsRef<Path> for ArcadePath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for ArcadePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for ArcadePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns true for entry names the rule tree never looks at (`.git`, `.arcade`, ...).
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
