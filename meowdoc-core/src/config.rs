use std::path::PathBuf;

use tracing::{debug, info};

use crate::ignore::IgnoreRules;
use crate::index::ProjectInfo;
use crate::themes::Theme;

/// Everything one pipeline run needs, already validated by the caller.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Source file or directory to document.
    pub input_path: PathBuf,
    /// MkDocs project directory (holds `mkdocs.yml`).
    pub project_dir: PathBuf,
    /// Name of the content directory inside the project.
    pub docs_dir_name: String,
    pub ignore: IgnoreRules,
    pub project: ProjectInfo,
    pub theme: Option<Theme>,
    /// Root of per-file hints and auxiliary pages.
    pub guide_dir: PathBuf,
    /// Cap on in-flight generations; `None` runs every file at once.
    pub concurrency: Option<usize>,
    /// Extra settings deep-merged into `mkdocs.yml`.
    pub site_settings: Option<serde_yaml::Value>,
    /// Write a generated `index.md` landing page.
    pub write_index: bool,
}

impl PipelineConfig {
    /// `<project_dir>/<docs_dir_name>`.
    pub fn content_dir(&self) -> PathBuf {
        self.project_dir.join(&self.docs_dir_name)
    }

    /// `<guide_dir>/(pages)`.
    pub fn pages_dir(&self) -> PathBuf {
        self.guide_dir.join(crate::pages::PAGES_DIR)
    }

    pub fn trace_loaded(&self) {
        info!(
            input_path = %self.input_path.display(),
            project_dir = %self.project_dir.display(),
            content_dir = %self.content_dir().display(),
            concurrency = ?self.concurrency,
            "Loaded pipeline config"
        );
        debug!(?self, "Pipeline config loaded (full debug)");
    }
}
