//! MkDocs project scaffolding via `mkdocs new`.

use std::path::Path;
use std::process::Command;

use serde_yaml::{Mapping, Value};
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::site_config::SiteConfig;

/// Ensure an MkDocs project exists in `project_dir`.
///
/// When `mkdocs.yml` is missing, `mkdocs new <project_dir>` is run and the new
/// document gets a `nav` pointing at `index.md`. An existing project is left
/// untouched. Returns whether a project was created.
pub fn ensure_project(project_dir: &Path) -> Result<bool> {
    ensure_project_with(project_dir, "mkdocs")
}

/// [`ensure_project`] with an explicit `mkdocs` executable.
pub fn ensure_project_with(project_dir: &Path, program: &str) -> Result<bool> {
    let config_path = SiteConfig::path_in(project_dir);
    if config_path.exists() {
        info!(dir = %project_dir.display(), "MkDocs project already exists");
        return Ok(false);
    }

    info!(dir = %project_dir.display(), "Creating new MkDocs project");
    let scaffold_err = |message: String| Error::Scaffold {
        path: project_dir.to_path_buf(),
        message,
    };

    let output = Command::new(program)
        .arg("new")
        .arg(project_dir)
        .output()
        .map_err(|e| {
            error!(error = ?e, program, "Failed to launch mkdocs");
            scaffold_err(format!("failed to launch `{program}`: {e}"))
        })?;

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(status = %output.status, %stdout, %stderr, "mkdocs new exited with non-zero code");
        return Err(scaffold_err(format!(
            "`{program} new` exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let mut config = SiteConfig::load(&config_path)?;
    let mut home = Mapping::new();
    home.insert(Value::from("Home"), Value::from("index.md"));
    let nav = config.nav_mut()?;
    nav.clear();
    nav.push(Value::Mapping(home));
    config.save()?;

    info!(dir = %project_dir.display(), "MkDocs project created");
    Ok(true)
}
