//! The MkDocs `mkdocs.yml` document, loaded, patched and rewritten in place.
//!
//! The document belongs to MkDocs, so it is kept as a loose YAML mapping and
//! only the keys meowdoc cares about (`site_name`, `theme`, `nav`) are
//! touched. Everything else round-trips unchanged.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// File name of the site configuration inside a project directory.
pub const SITE_CONFIG_FILE: &str = "mkdocs.yml";

/// A loaded site configuration document.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    path: PathBuf,
    doc: Mapping,
}

impl SiteConfig {
    /// `<project_dir>/mkdocs.yml`.
    pub fn path_in(project_dir: &Path) -> PathBuf {
        project_dir.join(SITE_CONFIG_FILE)
    }

    /// Read and parse the document at `path`.
    ///
    /// A missing file or invalid YAML is an error; nothing is written.
    pub fn load(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "[NAV] Loading site configuration");
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::SiteConfigMissing(path.to_path_buf()))
            }
            Err(e) => return Err(Error::io(path, e)),
        };
        let value: Value = serde_yaml::from_str(&raw).map_err(|source| Error::SiteConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = match value {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            other => {
                return Err(Error::SiteConfigShape {
                    path: path.to_path_buf(),
                    message: format!("expected a mapping at the top level, found {}", type_name(&other)),
                })
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }

    /// Wrap an in-memory document that will be saved to `path`.
    pub fn from_mapping(path: impl Into<PathBuf>, doc: Mapping) -> Self {
        Self {
            path: path.into(),
            doc,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.doc.get(key)
    }

    /// The top-level `nav` list, created empty if absent.
    ///
    /// A `nav` key holding anything other than a list (or null) is a
    /// malformed document.
    pub fn nav_mut(&mut self) -> Result<&mut Vec<Value>> {
        let key = Value::from("nav");
        let slot = self
            .doc
            .entry(key)
            .or_insert_with(|| Value::Sequence(Vec::new()));
        if slot.is_null() {
            *slot = Value::Sequence(Vec::new());
        }
        match slot {
            Value::Sequence(seq) => Ok(seq),
            other => Err(Error::SiteConfigShape {
                path: self.path.clone(),
                message: format!("`nav` must be a list, found {}", type_name(other)),
            }),
        }
    }

    pub fn set_site_name(&mut self, name: &str) {
        self.doc.insert(Value::from("site_name"), Value::from(name));
    }

    /// Set `theme` to `{name: <theme>}`, keeping other theme settings.
    pub fn set_theme(&mut self, theme: &str) {
        let mut incoming = Mapping::new();
        incoming.insert(Value::from("name"), Value::from(theme));
        let mut patch = Mapping::new();
        patch.insert(Value::from("theme"), Value::Mapping(incoming));
        self.merge_settings(&Value::Mapping(patch));
    }

    /// Deep-merge `incoming` settings into the document (see [`deep_merge`]).
    pub fn merge_settings(&mut self, incoming: &Value) {
        match incoming {
            Value::Mapping(_) => {
                let mut current = Value::Mapping(std::mem::take(&mut self.doc));
                deep_merge(&mut current, incoming);
                if let Value::Mapping(map) = current {
                    self.doc = map;
                }
            }
            Value::Null => {}
            other => warn!(kind = type_name(other), "[NAV] Ignoring non-mapping settings override"),
        }
    }

    /// Serialise and replace the file on disk.
    ///
    /// The text goes to a temporary file next to the target first and is
    /// renamed over it, so a failure never leaves a half-written document.
    pub fn save(&self) -> Result<()> {
        let write_err = |message: String| Error::SiteConfigWrite {
            path: self.path.clone(),
            message,
        };
        let text = serde_yaml::to_string(&self.doc).map_err(|e| write_err(e.to_string()))?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| write_err(e.to_string()))?;
        tmp.write_all(text.as_bytes())
            .map_err(|e| write_err(e.to_string()))?;
        tmp.persist(&self.path)
            .map_err(|e| write_err(e.error.to_string()))?;
        info!(path = %self.path.display(), "[NAV] Site configuration updated");
        Ok(())
    }
}

/// Recursive, right-biased merge of `incoming` into `target`.
///
/// Where both sides hold a mapping under the same key the mappings are
/// merged key by key; in every other case the incoming value replaces the
/// existing one. Keys present only in `target` are kept.
pub fn deep_merge(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Mapping(existing), Value::Mapping(new)) => {
            for (key, value) in new {
                match existing.get_mut(key) {
                    Some(slot) if slot.is_mapping() && value.is_mapping() => deep_merge(slot, value),
                    Some(slot) => {
                        debug!(key = ?key, "[NAV] Overriding setting");
                        *slot = value.clone();
                    }
                    None => {
                        existing.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, incoming) => *target = incoming.clone(),
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
