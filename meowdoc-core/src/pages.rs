//! Auxiliary pages: hand-written guides copied or expanded into the site.
//!
//! Files under `<guide_dir>/(pages)/` ending in [`PROMPT_SUFFIX`] are sent to
//! the generator as a prompt and the response is written with the suffix
//! stripped. Plain Markdown files are copied byte for byte. Anything else is
//! skipped.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::contract::Generator;
use crate::corpus::relative_key;
use crate::writer::write_file;

/// Directory name of auxiliary pages inside the guide tree.
pub const PAGES_DIR: &str = "(pages)";
/// Suffix marking a page whose content is a prompt.
pub const PROMPT_SUFFIX: &str = ".prompt";
/// Suffix of pages copied verbatim.
pub const DOC_SUFFIX: &str = ".md";

#[derive(Debug, Clone, PartialEq, Eq)]
enum PageKind {
    Prompt,
    Copy,
}

#[derive(Debug, Clone)]
struct PageJob {
    source: PathBuf,
    kind: PageKind,
    /// Output path relative to the content directory.
    target: String,
}

/// Output-relative path for a page at `relative` inside the pages directory.
fn classify(relative: &str) -> Option<(PageKind, String)> {
    if let Some(stripped) = relative.strip_suffix(PROMPT_SUFFIX) {
        if stripped.is_empty() || stripped.ends_with('/') {
            return None;
        }
        let target = if stripped.ends_with(DOC_SUFFIX) {
            stripped.to_string()
        } else {
            format!("{stripped}{DOC_SUFFIX}")
        };
        return Some((PageKind::Prompt, target));
    }
    if relative.ends_with(DOC_SUFFIX) {
        return Some((PageKind::Copy, relative.to_string()));
    }
    None
}

/// Process every page under `pages_dir` into `content_dir`.
///
/// Returns the written pages relative to `content_dir`, sorted. A missing
/// `pages_dir` yields an empty list.
pub async fn process_pages<G>(pages_dir: &Path, content_dir: &Path, generator: Arc<G>) -> Vec<String>
where
    G: Generator + 'static,
{
    if !pages_dir.is_dir() {
        debug!(dir = %pages_dir.display(), "[PAGES] No auxiliary pages directory");
        return Vec::new();
    }

    let mut jobs = Vec::new();
    for entry in WalkDir::new(pages_dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "[PAGES] Failed to read directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(relative) = relative_key(entry.path(), pages_dir) else {
            continue;
        };
        match classify(&relative) {
            Some((kind, target)) => jobs.push(PageJob {
                source: entry.path().to_path_buf(),
                kind,
                target,
            }),
            None => debug!(page = %relative, "[PAGES] Skipping unrecognised file type"),
        }
    }

    info!(pages = jobs.len(), "[PAGES] Processing auxiliary pages");

    let mut tasks = JoinSet::new();
    for job in jobs {
        let generator = Arc::clone(&generator);
        let content_dir = content_dir.to_path_buf();
        tasks.spawn(async move { run_job(job, &content_dir, generator.as_ref()).await });
    }

    let mut written = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Some(target)) => written.push(target),
            Ok(None) => {}
            Err(e) => error!(error = %e, "[PAGES] Page task aborted"),
        }
    }
    written.sort();
    written
}

async fn run_job<G: Generator + ?Sized>(job: PageJob, content_dir: &Path, generator: &G) -> Option<String> {
    let output = content_dir.join(&job.target);
    let bytes = match job.kind {
        PageKind::Copy => match std::fs::read(&job.source) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(page = %job.source.display(), error = ?e, "[PAGES] Failed to read page");
                return None;
            }
        },
        PageKind::Prompt => {
            let prompt = match std::fs::read_to_string(&job.source) {
                Ok(prompt) => prompt,
                Err(e) => {
                    error!(page = %job.source.display(), error = ?e, "[PAGES] Failed to read prompt page");
                    return None;
                }
            };
            match generator.generate(&prompt).await {
                Ok(text) if !text.trim().is_empty() => text.into_bytes(),
                Ok(_) => {
                    warn!(page = %job.source.display(), "[PAGES] Generator returned an empty page");
                    return None;
                }
                Err(e) => {
                    error!(page = %job.source.display(), error = %e, "[PAGES] Error calling generator");
                    return None;
                }
            }
        }
    };

    if write_file(&output, &bytes) {
        info!(page = %job.target, "[PAGES] Page written");
        Some(job.target)
    } else {
        None
    }
}
