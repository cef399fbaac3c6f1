//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

/// Characters that cannot appear in a file or directory name on the
/// platforms the rule repository is checked out on.
pub const ILLEGAL_COMPONENT_CHARS: [char; 9] = ['<', '>', ':', '"', '\\', '/', '|', '?', '*'];

/// A path normalized to use forward slashes internally.
///
/// Used both for filesystem locations and for container addresses inside
/// the backing store. The empty path is the root container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes for internal storage.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        let normalized = path_str.replace('\\', "/");
        Self { inner: normalized }
    }

    /// The root container address (empty relative path).
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether this is the empty root address.
    pub fn is_root(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    ///
    /// Joining onto the root address yields the segment itself.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        let joined = if self.inner.is_empty() {
            segment_normalized
        } else if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self { inner: joined }
    }

    /// Join every segment of a relative path onto this one.
    pub fn join_relative(&self, relative: &NormalizedPath) -> Self {
        relative
            .segments()
            .fold(self.clone(), |acc, segment| acc.join(segment))
    }

    /// Iterate over the non-empty `/`-separated components.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|s| !s.is_empty())
    }

    /// Get the parent directory.
    ///
    /// The parent of a single-segment relative path is the root address.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            _ if !trimmed.is_empty() => Some(Self::root()),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

/// Result of [`sanitize_component`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    /// The filesystem-legal name
    pub value: String,
    /// Every replaced character, one entry per occurrence, in order
    pub replaced: Vec<char>,
}

impl Sanitized {
    /// Whether any character had to be replaced.
    pub fn changed(&self) -> bool {
        !self.replaced.is_empty()
    }
}

/// Replace characters that are illegal in a path component with `_`.
///
/// A leading `.` is replaced too, since dot entries are hidden from the
/// rule tree.
pub fn sanitize_component(name: &str) -> Sanitized {
    let mut replaced = Vec::new();
    let value = name
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if ILLEGAL_COMPONENT_CHARS.contains(&c) || (i == 0 && c == '.') {
                replaced.push(c);
                '_'
            } else {
                c
            }
        })
        .collect();
    Sanitized { value, replaced }
}
