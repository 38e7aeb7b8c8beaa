//! # contract: the generation capability and the data passed through the pipeline
//!
//! The pipeline never talks to a language model directly. It receives an
//! implementation of [`Generator`] and calls it once per prompt. Concrete
//! backends (hosted APIs, a local HTTP endpoint) live in the CLI crate; tests
//! use the `mockall`-generated `MockGenerator`.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, exported when the
//!   `test-export-mocks` feature is on (default), so downstream crates can
//!   build deterministic mocks as well.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;

use mockall::automock;

/// Error returned by a generation backend.
pub type GenerateError = Box<dyn std::error::Error + Send + Sync>;

/// Capability: turn a prompt into text.
///
/// Implementors own transport, authentication and timeouts. An empty string
/// is a valid return value here; the dispatcher decides it counts as failure.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// One discovered source file: where it lives and its key in the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as discovered on disk (input root joined with the relative path).
    pub path: PathBuf,
    /// Root-relative path with `/` separators; unique key of the corpus.
    pub relative: String,
}

/// All source files of one run, keyed by relative path.
///
/// Built once before dispatch and never mutated afterwards, so it is shared
/// across generation tasks behind an `Arc` without locking.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// Input root the relative paths are computed against.
    pub root: PathBuf,
    /// True when the input was a single file rather than a directory.
    pub single_file: bool,
    pub(crate) files: BTreeMap<String, CorpusEntry>,
}

#[derive(Debug, Clone)]
pub(crate) struct CorpusEntry {
    pub(crate) path: PathBuf,
    pub(crate) content: String,
}

impl Corpus {
    /// Create an empty corpus for `root`.
    pub fn new(root: impl Into<PathBuf>, single_file: bool) -> Self {
        Self {
            root: root.into(),
            single_file,
            files: BTreeMap::new(),
        }
    }

    /// Insert a file; a later insert with the same relative path replaces the earlier one.
    pub fn insert(&mut self, file: SourceFile, content: String) {
        self.files.insert(
            file.relative,
            CorpusEntry {
                path: file.path,
                content,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Content stored under `relative`, if any.
    pub fn content(&self, relative: &str) -> Option<&str> {
        self.files.get(relative).map(|e| e.content.as_str())
    }

    /// Relative paths in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Every file as a [`SourceFile`], in sorted order.
    pub fn sources(&self) -> Vec<SourceFile> {
        self.files
            .iter()
            .map(|(relative, entry)| SourceFile {
                path: entry.path.clone(),
                relative: relative.clone(),
            })
            .collect()
    }

    /// `(relative path, content)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files
            .iter()
            .map(|(k, e)| (k.as_str(), e.content.as_str()))
    }
}

/// A generated page written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Relative path of the source the page documents.
    pub source: String,
    /// Where the page was written.
    pub output: PathBuf,
}

/// Outcome of a full run.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Pages generated from source files.
    pub artifacts: Vec<Artifact>,
    /// Relative paths for which no page was produced.
    pub failed: Vec<String>,
    /// Auxiliary pages, relative to the content directory.
    pub pages: Vec<String>,
    /// Whether the site configuration was rewritten.
    pub nav_updated: bool,
}
