//! Error taxonomy for the documentation pipeline.
//!
//! Only configuration-level and navigation-merge-level failures surface as
//! [`Error`] values to the caller. Per-file failures (unreadable sources,
//! backend errors, failed writes) are logged where they happen and simply
//! produce fewer artifacts.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for meowdoc-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem operation failed outside of a per-file context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An ignore pattern is not a valid shell glob.
    #[error("invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// The site configuration document does not exist.
    #[error("site configuration not found at {0}; create a MkDocs project first")]
    SiteConfigMissing(PathBuf),

    /// The site configuration document is not valid YAML.
    #[error("failed to parse site configuration {path}: {source}")]
    SiteConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The site configuration parsed but has an unexpected structure.
    #[error("malformed site configuration {path}: {message}")]
    SiteConfigShape { path: PathBuf, message: String },

    /// The updated site configuration could not be persisted.
    #[error("failed to write site configuration {path}: {message}")]
    SiteConfigWrite { path: PathBuf, message: String },

    /// Creating the MkDocs project skeleton failed.
    #[error("failed to scaffold MkDocs project in {path}: {message}")]
    Scaffold { path: PathBuf, message: String },
}

/// Result alias used throughout meowdoc-core.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
