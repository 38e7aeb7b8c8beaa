//! Path filter: shell-glob ignore rules matched against every path segment.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;

use crate::error::{Error, Result};

/// Patterns used when the settings document does not list any.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    ".venv",
    "venv",
    "node_modules",
    ".git",
    "__pycache__",
    ".env",
    "requirements.txt",
];

/// Ordered, immutable set of compiled ignore patterns.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<Pattern>,
}

impl IgnoreRules {
    /// Compile `patterns`; an invalid glob is a configuration error.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).map_err(|source| Error::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// The built-in defaults.
    pub fn defaults() -> Self {
        Self::new(DEFAULT_IGNORE_PATTERNS).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True when the base name of `path` or of any ancestor matches a pattern.
    ///
    /// The path is made absolute first, so relative inputs are checked all the
    /// way up to the filesystem root as well.
    pub fn should_ignore(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let absolute = absolutize(path);
        let mut current: &Path = &absolute;
        loop {
            if let Some(name) = current.file_name().and_then(|n| n.to_str()) {
                if let Some(pattern) = self.patterns.iter().find(|p| p.matches(name)) {
                    debug!(path = %path.display(), pattern = %pattern, "Path matches ignore pattern");
                    return true;
                }
            }
            match current.parent() {
                Some(parent) if parent != current => current = parent,
                _ => return false,
            }
        }
    }
}

/// Free-function form of [`IgnoreRules::should_ignore`].
pub fn should_ignore(path: &Path, rules: &IgnoreRules) -> bool {
    rules.should_ignore(path)
}

/// Absolute, lexically normalised form of `path` without touching symlinks.
fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let mut normalised = PathBuf::new();
    for component in joined.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                normalised.pop();
            }
            other => normalised.push(other.as_os_str()),
        }
    }
    normalised
}
