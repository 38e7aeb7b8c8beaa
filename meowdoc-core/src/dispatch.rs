//! Generation dispatcher: one concurrent task per corpus entry.
//!
//! Every task receives the whole corpus as context, so the corpus is frozen
//! behind an `Arc` before the first task is spawned. Results are handed to
//! the caller in completion order, each tagged with the source it belongs
//! to; nothing downstream relies on submission order.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::contract::{Corpus, Generator, SourceFile};

const INSTRUCTIONS: &str = "
Include:
*   A concise module-level description.
*   Descriptions of functions and classes, including parameters, return values, and docstrings.
*   Clearly indicate how this file interacts with other modules (using examples).
*   Provide example usage where possible.
*   Use clear headings and subheadings (e.g., ##, ###).
*   If there are no docstrings, infer the purpose of the code from its structure and names.
";

/// Knobs for a dispatch run.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Root of the per-file hint tree (`docguide/` by default).
    pub guide_dir: Option<PathBuf>,
    /// Upper bound on in-flight generations; `None` means one task per file, unbounded.
    pub concurrency: Option<usize>,
}

/// Result of one generation task.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub source: SourceFile,
    /// Generated text; `None` when the backend failed or returned nothing.
    pub text: Option<String>,
}

/// Location of the hint file for `source` under `guide_dir`.
///
/// Root, prefix and `..` components of `source` are dropped so the hint always
/// lives inside the guide tree: `src/pkg/a.py` maps to
/// `docguide/src/pkg/a.py.md`.
pub fn guide_path(guide_dir: &Path, source: &Path) -> PathBuf {
    let mut path = guide_dir.to_path_buf();
    for component in source.components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::Prefix(_) | Component::RootDir | Component::CurDir | Component::ParentDir => {}
        }
    }
    let mut file = path.into_os_string();
    file.push(".md");
    PathBuf::from(file)
}

/// Build the prompt for `target`: its content, every other file as context,
/// the fixed instruction block and, when present, the hint text.
///
/// Returns `None` if `target` is not in the corpus.
pub fn build_prompt(target: &str, corpus: &Corpus, guide: Option<&str>) -> Option<String> {
    let code = corpus.content(target)?;

    let mut prompt = String::from(
        "Generate comprehensive documentation in Markdown format for the following source file \
         (do not wrap the Markdown in backticks), considering the context of related files:\n\n",
    );
    prompt.push_str(&format!("File: {target}\n```\n{code}\n```\n\n"));

    prompt.push_str("Context from related files:\n\n");
    for (other, other_code) in corpus.iter() {
        if other != target {
            prompt.push_str(&format!("File: {other}\n```\n{other_code}\n```\n\n"));
        }
    }

    prompt.push_str(INSTRUCTIONS);

    if let Some(guide) = guide {
        prompt.push_str(&format!("\n\n### Additional Guidelines:\n{guide}\n"));
    }
    Some(prompt)
}

/// Run one generation per corpus entry and call `on_outcome` as each finishes.
///
/// A failure in one task (backend error, empty response, panic) only affects
/// that task's outcome.
pub async fn dispatch<G, F>(
    corpus: Arc<Corpus>,
    generator: Arc<G>,
    options: &DispatchOptions,
    mut on_outcome: F,
) where
    G: Generator + 'static,
    F: FnMut(Outcome),
{
    let limit = options
        .concurrency
        .filter(|n| *n > 0)
        .map(|n| Arc::new(Semaphore::new(n)));

    info!(
        files = corpus.len(),
        concurrency = ?options.concurrency,
        "[GEN] Dispatching generation tasks"
    );

    let mut tasks = JoinSet::new();
    for source in corpus.sources() {
        let corpus = Arc::clone(&corpus);
        let generator = Arc::clone(&generator);
        let limit = limit.clone();
        let guide_dir = options.guide_dir.clone();
        tasks.spawn(async move {
            let _permit = match &limit {
                Some(semaphore) => semaphore.acquire().await.ok(),
                None => None,
            };
            let text = generate_one(&corpus, generator.as_ref(), &source, guide_dir.as_deref()).await;
            Outcome { source, text }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => on_outcome(outcome),
            Err(e) => error!(error = %e, "[GEN] Generation task aborted"),
        }
    }
}

async fn generate_one<G: Generator + ?Sized>(
    corpus: &Corpus,
    generator: &G,
    source: &SourceFile,
    guide_dir: Option<&Path>,
) -> Option<String> {
    let guide = guide_dir.and_then(|dir| read_guide(dir, &source.path));
    let Some(prompt) = build_prompt(&source.relative, corpus, guide.as_deref()) else {
        error!(relative = %source.relative, "[GEN] File content not found in corpus");
        return None;
    };

    debug!(relative = %source.relative, prompt_len = prompt.len(), "[GEN] Calling generator");
    match generator.generate(&prompt).await {
        Ok(text) if text.trim().is_empty() => {
            warn!(relative = %source.relative, "[GEN] Generator returned an empty response");
            None
        }
        Ok(text) => {
            info!(relative = %source.relative, "[GEN] Generated content");
            Some(text)
        }
        Err(e) => {
            error!(relative = %source.relative, error = %e, "[GEN] Error calling generator");
            None
        }
    }
}

fn read_guide(guide_dir: &Path, source: &Path) -> Option<String> {
    let path = guide_path(guide_dir, source);
    if !path.is_file() {
        return None;
    }
    match std::fs::read_to_string(&path) {
        Ok(content) => {
            info!(guide = %path.display(), "[GEN] Docguide content found");
            Some(content)
        }
        Err(e) => {
            warn!(guide = %path.display(), error = ?e, "[GEN] Failed to read docguide file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Corpus {
        let mut corpus = Corpus::new("/repo", false);
        for (rel, content) in [("a.py", "print('a')"), ("pkg/b.py", "def b(): pass")] {
            corpus.insert(
                SourceFile {
                    path: PathBuf::from("/repo").join(rel),
                    relative: rel.to_string(),
                },
                content.to_string(),
            );
        }
        corpus
    }

    #[test]
    fn prompt_puts_target_first_and_others_as_context() {
        let prompt = build_prompt("pkg/b.py", &corpus(), None).unwrap();
        let target = prompt.find("File: pkg/b.py").unwrap();
        let context = prompt.find("Context from related files").unwrap();
        let other = prompt.find("File: a.py").unwrap();
        assert!(target < context && context < other);
        assert_eq!(prompt.matches("File: pkg/b.py").count(), 1);
        assert!(prompt.contains("Include:"));
        assert!(!prompt.contains("Additional Guidelines"));
    }

    #[test]
    fn prompt_appends_guide() {
        let prompt = build_prompt("a.py", &corpus(), Some("Mention the CLI.")).unwrap();
        assert!(prompt.ends_with("### Additional Guidelines:\nMention the CLI.\n"));
    }

    #[test]
    fn prompt_for_unknown_target_is_none() {
        assert!(build_prompt("missing.py", &corpus(), None).is_none());
    }

    #[test]
    fn guide_path_nests_under_guide_dir() {
        assert_eq!(
            guide_path(Path::new("docguide"), Path::new("src/pkg/a.py")),
            PathBuf::from("docguide/src/pkg/a.py.md")
        );
        assert_eq!(
            guide_path(Path::new("docguide"), Path::new("/abs/a.py")),
            PathBuf::from("docguide/abs/a.py.md")
        );
    }

    #[test]
    fn guide_path_never_leaves_guide_dir() {
        assert_eq!(
            guide_path(Path::new("docguide"), Path::new("../proj/a.py")),
            PathBuf::from("docguide/proj/a.py.md")
        );
        assert_eq!(
            guide_path(Path::new("docguide"), Path::new("src/../../a.py")),
            PathBuf::from("docguide/src/a.py.md")
        );
    }
}
