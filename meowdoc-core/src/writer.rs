//! Output writer: mirror a relative source path into the content directory.
//!
//! Every source gets exactly one page name. Sources that would share a page
//! (`a.py` and `a.rs` both mapping to `a.md`) keep their extension instead,
//! so concurrent writers never target the same file.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

fn split_dir(relative: &str) -> (Option<&str>, &str) {
    match relative.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, relative),
    }
}

fn join_page(dir: Option<&str>, base: &str) -> String {
    match dir {
        Some(dir) => format!("{dir}/{base}.md"),
        None => format!("{base}.md"),
    }
}

/// `<dirname(relative)>/<stem(relative)>.md`, relative to the content directory.
pub fn page_name(relative: &str) -> String {
    let (dir, file) = split_dir(relative);
    let stem = Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string());
    join_page(dir, &stem)
}

/// Assign a distinct page name to every source in `relatives`.
///
/// Sources whose default page names collide keep their full file name
/// (`a.py.md`, `a.rs.md`). A name that is still taken gets a numeric suffix.
/// The result only depends on the set of inputs, never on their order.
pub fn plan_pages<I, S>(relatives: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let sources: BTreeSet<String> = relatives.into_iter().map(|r| r.as_ref().to_string()).collect();

    let mut claims: HashMap<String, usize> = HashMap::new();
    for source in &sources {
        *claims.entry(page_name(source)).or_default() += 1;
    }

    let mut taken: BTreeSet<String> = BTreeSet::new();
    let mut plan = BTreeMap::new();
    for source in &sources {
        let default = page_name(source);
        let (dir, file) = split_dir(source);
        let mut page = if claims.get(&default).copied().unwrap_or(0) > 1 {
            join_page(dir, file)
        } else {
            default.clone()
        };
        let mut n = 1;
        while taken.contains(&page) {
            n += 1;
            page = join_page(dir, &format!("{file}-{n}"));
        }
        if page != default {
            warn!(source = %source, page = %page, "[WRITE] Page name collides with another source, renaming");
        }
        taken.insert(page.clone());
        plan.insert(source.clone(), page);
    }
    plan
}

/// `<content_dir>/<dirname(relative)>/<stem(relative)>.md`.
pub fn output_path(content_dir: &Path, relative: &str) -> PathBuf {
    content_dir.join(page_name(relative))
}

/// Write `text` to `path`, creating parent directories as needed.
///
/// Returns `false` (after logging) when the directory or file cannot be
/// written; callers treat that as "no artifact" and keep going.
pub fn write_file(path: &Path, text: &[u8]) -> bool {
    if let Some(parent) = path.parent() {
        // create_dir_all tolerates concurrent creation of the same parent.
        if let Err(e) = fs::create_dir_all(parent) {
            error!(error = ?e, path = %parent.display(), "[WRITE] Failed to create output directory");
            return false;
        }
    }
    match fs::write(path, text) {
        Ok(()) => true,
        Err(e) => {
            error!(error = ?e, path = %path.display(), "[WRITE] Failed to write output file");
            false
        }
    }
}

/// Write a generated page to `<content_dir>/<page>` and return its path on success.
pub fn write_artifact(content_dir: &Path, page: &str, text: &str) -> Option<PathBuf> {
    let path = content_dir.join(page);
    if write_file(&path, text.as_bytes()) {
        info!(page = %page, output = %path.display(), "[WRITE] Documentation written");
        Some(path)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn output_path_rewrites_extension_and_mirrors_dirs() {
        let dir = Path::new("site/docs");
        assert_eq!(output_path(dir, "pkg/sub/mod.py"), PathBuf::from("site/docs/pkg/sub/mod.md"));
        assert_eq!(output_path(dir, "top.rs"), PathBuf::from("site/docs/top.md"));
        assert_eq!(output_path(dir, "Makefile"), PathBuf::from("site/docs/Makefile.md"));
    }

    #[test]
    fn write_artifact_creates_dirs_and_overwrites() {
        let tmp = tempdir().unwrap();
        let first = write_artifact(tmp.path(), "pkg/a.md", "old").unwrap();
        let second = write_artifact(tmp.path(), "pkg/a.md", "new").unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&second).unwrap(), "new");
    }

    #[test]
    fn write_failure_yields_none() {
        let tmp = tempdir().unwrap();
        // A regular file where a directory is expected.
        fs::write(tmp.path().join("pkg"), "not a dir").unwrap();
        assert!(write_artifact(tmp.path(), "pkg/a.md", "text").is_none());
    }

    #[test]
    fn distinct_sources_keep_default_names() {
        let plan = plan_pages(["pkg/mod.py", "top.rs"]);
        assert_eq!(plan["pkg/mod.py"], "pkg/mod.md");
        assert_eq!(plan["top.rs"], "top.md");
    }

    #[test]
    fn sources_sharing_a_stem_keep_their_extension() {
        let plan = plan_pages(["pkg/a.rs", "pkg/a.py", "pkg/b.py"]);
        assert_eq!(plan["pkg/a.py"], "pkg/a.py.md");
        assert_eq!(plan["pkg/a.rs"], "pkg/a.rs.md");
        assert_eq!(plan["pkg/b.py"], "pkg/b.md");
    }

    #[test]
    fn renamed_page_never_lands_on_another_source() {
        // `a.py` is renamed to `a.py.md`, which `a.py.md` itself would also claim.
        let plan = plan_pages(["a.py", "a.rs", "a.py.md"]);
        let pages: BTreeSet<&String> = plan.values().collect();
        assert_eq!(pages.len(), 3);
    }
}
