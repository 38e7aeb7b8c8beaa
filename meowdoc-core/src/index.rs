//! Landing page (`index.md`) for the generated site.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::contract::Generator;
use crate::error::{Error, Result};

/// File name of the landing page inside the content directory.
pub const INDEX_PAGE: &str = "index.md";

const CONTRIBUTING_FALLBACK: &str = "AI-generated content could not be loaded.";

/// Project metadata shown on the landing page.
#[derive(Debug, Clone, Default)]
pub struct ProjectInfo {
    pub name: String,
    pub description: String,
    pub repo_url: String,
}

impl ProjectInfo {
    /// Package-style slug: lower case, underscores replaced by dashes.
    pub fn slug(&self) -> String {
        self.name.to_lowercase().replace('_', "-")
    }
}

fn contributing_prompt(slug: &str) -> String {
    format!(
        "Generate a 'Contributing' section for a project named {slug} in markdown. \
         Do not give the response in backticks.\n\
         Include guidelines for contributing, such as setting up the development environment \
         and submitting pull requests.\n"
    )
}

/// Render the landing page around an already generated contributing section.
pub fn render_index(project: &ProjectInfo, contributing: &str) -> String {
    let slug = project.slug();
    let repository = if project.repo_url.is_empty() {
        "Not published yet.".to_string()
    } else {
        format!("[{slug}]({})", project.repo_url)
    };
    format!(
        "# {slug}\n\n\
         {description}\n\n\
         ## Getting Started\n\n\
         This section provides a quick overview of how to get started with {slug}.\n\n\
         ### Installation\n\n\
         ```bash\npip install {slug}\n```\n\n\
         ## Contributing\n\n\
         {contributing}\n\n\
         ## License\n\n\
         MIT License\n\n\
         ## Repository\n\n\
         {repository}\n",
        description = project.description,
    )
}

/// Ask the generator for a contributing section and write `<content_dir>/index.md`.
///
/// A generation failure falls back to a placeholder paragraph; only a failed
/// write is an error.
pub async fn create_project_index<G>(content_dir: &Path, project: &ProjectInfo, generator: &G) -> Result<PathBuf>
where
    G: Generator + ?Sized,
{
    let contributing = match generator.generate(&contributing_prompt(&project.slug())).await {
        Ok(text) if !text.trim().is_empty() => {
            info!("[INDEX] Generated contributing section");
            text
        }
        Ok(_) => {
            warn!("[INDEX] Generator returned an empty contributing section");
            CONTRIBUTING_FALLBACK.to_string()
        }
        Err(e) => {
            error!(error = %e, "[INDEX] Error calling generator for contributing section");
            CONTRIBUTING_FALLBACK.to_string()
        }
    };

    std::fs::create_dir_all(content_dir).map_err(|e| Error::io(content_dir, e))?;
    let path = content_dir.join(INDEX_PAGE);
    std::fs::write(&path, render_index(project, &contributing)).map_err(|e| Error::io(&path, e))?;
    info!(path = %path.display(), "[INDEX] index.md written");
    Ok(path)
}
