//! Corpus collection: walk the input root and read every non-ignored file.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::contract::{Corpus, SourceFile};
use crate::error::{Error, Result};
use crate::ignore::IgnoreRules;

/// Collect the corpus for `input`.
///
/// A directory is walked recursively; ignored directories are pruned without
/// descending. A single file yields a one-entry corpus keyed by its file
/// name. Paths listed in `exclude` (typically the site project and content
/// directories) are never read, so previously generated pages do not feed
/// back into the next run. Unreadable or non-UTF-8 files are logged and
/// skipped.
pub fn collect(input: &Path, rules: &IgnoreRules, exclude: &[PathBuf]) -> Result<Corpus> {
    let metadata = fs::metadata(input).map_err(|e| Error::io(input, e))?;

    if metadata.is_file() {
        info!(path = %input.display(), "[COLLECT] Input is a single file");
        let mut corpus = Corpus::new(input.parent().unwrap_or(Path::new("")), true);
        let relative = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(content) = read_text(input) {
            corpus.insert(
                SourceFile {
                    path: input.to_path_buf(),
                    relative,
                },
                content,
            );
        }
        return Ok(corpus);
    }

    info!(path = %input.display(), "[COLLECT] Walking input directory");
    let excluded: Vec<PathBuf> = exclude.iter().filter_map(|p| p.canonicalize().ok()).collect();
    let root_canonical = input.canonicalize().map_err(|e| Error::io(input, e))?;
    let mut corpus = Corpus::new(input, false);

    let walker = WalkDir::new(input)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            // The root itself is always entered, even when it lives inside an excluded tree.
            if entry.depth() == 0 {
                return true;
            }
            if rules.should_ignore(entry.path()) {
                debug!(path = %entry.path().display(), "[COLLECT] Skipping ignored path");
                return false;
            }
            if entry.file_type().is_dir() {
                if let Ok(canonical) = entry.path().canonicalize() {
                    if canonical != root_canonical && excluded.contains(&canonical) {
                        debug!(path = %entry.path().display(), "[COLLECT] Skipping output directory");
                        return false;
                    }
                }
            }
            true
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "[COLLECT] Failed to read directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(relative) = relative_key(path, input) else {
            warn!(path = %path.display(), "[COLLECT] Path is not under the input root");
            continue;
        };
        if let Some(content) = read_text(path) {
            debug!(relative = %relative, size = content.len(), "[COLLECT] Added file to corpus");
            corpus.insert(
                SourceFile {
                    path: path.to_path_buf(),
                    relative,
                },
                content,
            );
        }
    }

    info!(files = corpus.len(), "[COLLECT] Corpus collected");
    Ok(corpus)
}

/// `path` relative to `root`, joined with `/` regardless of platform.
pub fn relative_key(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

fn read_text(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => Some(text),
            Err(e) => {
                error!(path = %path.display(), error = %e, "[COLLECT] File is not valid UTF-8, skipping");
                None
            }
        },
        Err(e) => {
            error!(path = %path.display(), error = ?e, "[COLLECT] Failed reading file, skipping");
            None
        }
    }
}
