//! Navigation merging: turn generated page paths into MkDocs `nav` entries.
//!
//! Directory runs nest every page under a dedicated `API` section that
//! mirrors the content directory layout. Single-file runs add one entry to
//! the top-level list. Both are idempotent: running again over the same pages
//! leaves the list unchanged.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};

use crate::corpus::relative_key;
use crate::error::{Error, Result};
use crate::site_config::{type_name, SiteConfig};
use crate::themes::Theme;

/// Top-level `nav` key grouping every page generated from source.
pub const API_SECTION: &str = "API";

/// Nested page structure mirroring the content directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTree {
    /// A page: its path relative to the content directory.
    Leaf(String),
    /// A directory: segment name to subtree, in sorted order.
    Node(BTreeMap<String, NavTree>),
}

impl Default for NavTree {
    fn default() -> Self {
        NavTree::Node(BTreeMap::new())
    }
}

impl NavTree {
    /// Build a tree from `/`-separated page paths relative to the content directory.
    ///
    /// Paths are sorted first so the result does not depend on the order in
    /// which pages were produced.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut paths: Vec<String> = paths.into_iter().map(|p| p.as_ref().to_string()).collect();
        paths.sort();
        paths.dedup();

        let mut root = BTreeMap::new();
        for path in &paths {
            let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            if !segments.is_empty() {
                insert(&mut root, &segments, path);
            }
        }
        NavTree::Node(root)
    }

    /// Convert to the persisted list-of-single-key-maps form.
    ///
    /// A leaf becomes `{name: path}`; a node becomes `{name: [children...]}`.
    /// Calling this on a leaf yields an empty list.
    pub fn to_nav(&self) -> Vec<Value> {
        match self {
            NavTree::Leaf(_) => Vec::new(),
            NavTree::Node(children) => children
                .iter()
                .map(|(name, child)| {
                    let value = match child {
                        NavTree::Leaf(path) => Value::from(path.as_str()),
                        NavTree::Node(_) => Value::Sequence(child.to_nav()),
                    };
                    single_entry(name, value)
                })
                .collect(),
        }
    }
}

fn insert(level: &mut BTreeMap<String, NavTree>, segments: &[&str], path: &str) {
    let (first, rest) = match segments.split_first() {
        Some(split) => split,
        None => return,
    };

    if rest.is_empty() {
        let stem = Path::new(first)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| first.to_string());
        // A directory of the same name keeps the stem; the page falls back to its file name.
        let key = match level.get(&stem) {
            Some(NavTree::Node(_)) => first.to_string(),
            _ => stem,
        };
        level.insert(key, NavTree::Leaf(path.to_string()));
        return;
    }

    let dir = first.to_string();
    if let Some(NavTree::Leaf(existing)) = level.get(&dir) {
        let existing = existing.clone();
        let file_name = existing.rsplit('/').next().unwrap_or(&existing).to_string();
        debug!(dir = %dir, page = %existing, "[NAV] Page name collides with a directory, keying by file name");
        level.remove(&dir);
        level.insert(file_name, NavTree::Leaf(existing));
    }
    let child = level
        .entry(dir)
        .or_insert_with(|| NavTree::Node(BTreeMap::new()));
    if let NavTree::Node(children) = child {
        insert(children, rest, path);
    }
}

fn single_entry(key: &str, value: Value) -> Value {
    let mut map = Mapping::new();
    map.insert(Value::from(key), value);
    Value::Mapping(map)
}

/// Remove duplicate entries from a `nav` list, recursively.
///
/// Entries are compared structurally with mapping keys sorted; the first
/// occurrence wins. Sibling subtrees sharing a key (`{pkg: [...]}` twice)
/// are coalesced into the first one before their children are deduplicated.
pub fn dedup_entries(entries: &mut Vec<Value>) {
    let mut kept: Vec<Value> = Vec::with_capacity(entries.len());
    let mut seen: HashSet<String> = HashSet::new();

    for entry in entries.drain(..) {
        if let Some(key) = subtree_key(&entry).cloned() {
            if let Some(pos) = kept.iter().position(|k| subtree_key(k) == Some(&key)) {
                let children = into_children(entry);
                if let Some(existing) = children_mut(&mut kept[pos]) {
                    existing.extend(children);
                }
                continue;
            }
        }
        if seen.insert(canonical(&entry)) {
            kept.push(entry);
        }
    }

    for entry in kept.iter_mut() {
        if let Some(children) = children_mut(entry) {
            dedup_entries(children);
        }
    }
    *entries = kept;
}

/// Key of a `{key: [..]}` entry.
fn subtree_key(entry: &Value) -> Option<&Value> {
    let map = entry.as_mapping()?;
    if map.len() != 1 {
        return None;
    }
    let (key, value) = map.iter().next()?;
    value.is_sequence().then_some(key)
}

fn into_children(entry: Value) -> Vec<Value> {
    match entry {
        Value::Mapping(map) => map
            .into_iter()
            .next()
            .and_then(|(_, v)| match v {
                Value::Sequence(seq) => Some(seq),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn children_mut(entry: &mut Value) -> Option<&mut Vec<Value>> {
    let map = entry.as_mapping_mut()?;
    if map.len() != 1 {
        return None;
    }
    map.values_mut().next()?.as_sequence_mut()
}

/// Order-independent textual form of a YAML value.
fn canonical(value: &Value) -> String {
    match value {
        Value::Mapping(map) => {
            let mut parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}:{}", canonical(k), canonical(v)))
                .collect();
            parts.sort();
            format!("{{{}}}", parts.join(","))
        }
        Value::Sequence(seq) => {
            let parts: Vec<String> = seq.iter().map(canonical).collect();
            format!("[{}]", parts.join(","))
        }
        other => format!("{other:?}"),
    }
}

/// Every page path referenced anywhere inside `value`.
fn collect_leaf_paths<'a>(value: &'a Value, into: &mut HashSet<&'a str>) {
    match value {
        Value::String(path) => {
            into.insert(path.as_str());
        }
        Value::Sequence(seq) => seq.iter().for_each(|item| collect_leaf_paths(item, into)),
        Value::Mapping(map) => map.values().for_each(|item| collect_leaf_paths(item, into)),
        _ => {}
    }
}

/// Append the tree for `pages` (paths relative to the content directory)
/// under the [`API_SECTION`] of `nav`, creating the section if needed, then
/// deduplicate the section. Pages the section already links to, at any depth
/// and under any title, are not added again.
pub fn merge_api_section(config: &mut SiteConfig, pages: &[String]) -> Result<()> {
    let path = config.path().to_path_buf();
    let nav = config.nav_mut()?;

    let position = nav
        .iter()
        .position(|item| item.as_mapping().is_some_and(|m| m.contains_key(API_SECTION)));
    let position = match position {
        Some(pos) => pos,
        None => {
            info!("[NAV] Creating API section");
            nav.push(single_entry(API_SECTION, Value::Sequence(Vec::new())));
            nav.len() - 1
        }
    };

    let section = nav[position]
        .as_mapping_mut()
        .and_then(|m| m.get_mut(API_SECTION))
        .ok_or_else(|| Error::SiteConfigShape {
            path: path.clone(),
            message: "API section disappeared during merge".to_string(),
        })?;
    if section.is_null() {
        *section = Value::Sequence(Vec::new());
    }
    let entries = match section {
        Value::Sequence(seq) => seq,
        other => {
            return Err(Error::SiteConfigShape {
                path,
                message: format!("`{API_SECTION}` nav section must be a list, found {}", type_name(other)),
            })
        }
    };

    let fresh: Vec<&String> = {
        let mut known = HashSet::new();
        entries.iter().for_each(|entry| collect_leaf_paths(entry, &mut known));
        pages.iter().filter(|page| !known.contains(page.as_str())).collect()
    };
    let before = entries.len();
    if !fresh.is_empty() {
        entries.extend(NavTree::from_paths(fresh).to_nav());
    }
    dedup_entries(entries);
    info!(before, after = entries.len(), pages = pages.len(), "[NAV] Merged API section");
    Ok(())
}

/// Add `{stem: relative_path}` to the top-level `nav` unless an identical
/// entry is already there. Returns whether the list changed.
pub fn merge_single_page(config: &mut SiteConfig, relative_path: &str) -> Result<bool> {
    let stem = Path::new(relative_path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| relative_path.to_string());
    let entry = single_entry(&stem, Value::from(relative_path));
    let key = canonical(&entry);

    let nav = config.nav_mut()?;
    if nav.iter().any(|item| canonical(item) == key) {
        debug!(page = %relative_path, "[NAV] Entry already present");
        return Ok(false);
    }
    nav.push(entry);
    Ok(true)
}

/// Everything needed to patch the site configuration after a run.
#[derive(Debug, Clone)]
pub struct NavUpdate<'a> {
    /// MkDocs project directory holding `mkdocs.yml`.
    pub project_dir: &'a Path,
    /// Content directory pages were written to.
    pub content_dir: &'a Path,
    /// Generated page paths.
    pub outputs: &'a [PathBuf],
    /// Input was a single file rather than a directory.
    pub single_file: bool,
    /// New `site_name`, skipped when empty.
    pub site_name: Option<&'a str>,
    pub theme: Option<Theme>,
    /// Extra settings deep-merged last, so they override everything above.
    pub settings: Option<&'a Value>,
}

/// Load `mkdocs.yml`, merge navigation and settings, and write it back.
///
/// Nothing is written unless every step succeeds.
pub fn update_navigation(update: &NavUpdate<'_>) -> Result<()> {
    let config_path = SiteConfig::path_in(update.project_dir);
    let mut config = SiteConfig::load(&config_path)?;

    if let Some(name) = update.site_name.filter(|n| !n.is_empty()) {
        config.set_site_name(name);
    }
    if let Some(theme) = update.theme {
        config.set_theme(theme.mkdocs_name());
    }

    if update.single_file {
        let mut outputs: Vec<&PathBuf> = update.outputs.iter().collect();
        outputs.sort();
        if let Some(first) = outputs.first() {
            if outputs.len() > 1 {
                warn!(
                    used = %first.display(),
                    ignored = outputs.len() - 1,
                    "[NAV] Single-file mode produced several pages; only the first is added to nav"
                );
            }
            let relative = relative_key(first, update.project_dir)
                .unwrap_or_else(|| first.to_string_lossy().replace('\\', "/"));
            merge_single_page(&mut config, &relative)?;
        }
    } else {
        let pages: Vec<String> = update
            .outputs
            .iter()
            .filter_map(|p| {
                let rel = relative_key(p, update.content_dir);
                if rel.is_none() {
                    warn!(page = %p.display(), "[NAV] Page is outside the content directory, skipping");
                }
                rel
            })
            .collect();
        merge_api_section(&mut config, &pages)?;
    }

    if let Some(settings) = update.settings {
        config.merge_settings(settings);
    }

    config.save()
}
