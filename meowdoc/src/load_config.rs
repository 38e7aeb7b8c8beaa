//! `load_config`: reads the TOML settings document and resolves credentials.
//!
//! This is the only place where the user's `config.toml` is parsed. Sections
//! map onto typed structs; anything with a sensible default may be omitted,
//! but `[main]` and `[llm]` must be present.
//!
//! # Errors
//! Every failure is an `anyhow::Error` with the file path in its context and
//! is surfaced at the CLI boundary before any source file is processed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use meowdoc_core::ignore::DEFAULT_IGNORE_PATTERNS;
use meowdoc_core::index::ProjectInfo;
use meowdoc_core::themes::Theme;
use serde::Deserialize;
use tracing::{debug, error, info};

/// The whole settings document.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub main: MainSection,
    #[serde(default)]
    pub ignore: IgnoreSection,
    #[serde(default)]
    pub project: ProjectSection,
    pub llm: LlmSection,
    /// Arbitrary keys deep-merged into `mkdocs.yml`.
    #[serde(default)]
    pub mkdocs: Option<toml::Table>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainSection {
    #[serde(default)]
    pub input_path: Option<PathBuf>,
    #[serde(default = "default_dir")]
    pub mkdocs_dir: PathBuf,
    #[serde(default = "default_docs_dir_name")]
    pub docs_dir_name: String,
    #[serde(default)]
    pub create_mkdocs: bool,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub concurrency: Option<usize>,
    #[serde(default = "default_guide_dir")]
    pub guide_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IgnoreSection {
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
}

impl Default for IgnoreSection {
    fn default() -> Self {
        Self {
            patterns: default_patterns(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectSection {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub repo_url: String,
}

impl From<&ProjectSection> for ProjectInfo {
    fn from(p: &ProjectSection) -> Self {
        ProjectInfo {
            name: p.name.clone(),
            description: p.description.clone(),
            repo_url: p.repo_url.clone(),
        }
    }
}

/// Backend selection for generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    #[value(name = "openai")]
    OpenAi,
    Ollama,
}

impl ProviderKind {
    /// Environment variable consulted when no key is configured.
    pub fn api_key_env(self) -> Option<&'static str> {
        match self {
            ProviderKind::Gemini => Some("GOOGLE_API_KEY"),
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::Ollama => None,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-2.0-flash",
            ProviderKind::OpenAi => "gpt-3.5-turbo-instruct",
            ProviderKind::Ollama => "llama3",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    pub provider: ProviderKind,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<PathBuf>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl LlmSection {
    /// Configured model, or the provider's default.
    pub fn model(&self) -> String {
        self.model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(self.provider.default_model())
            .to_string()
    }

    /// Resolve the credential: explicit key, then key file, then environment.
    ///
    /// Providers that need no credential yield `Ok(None)`.
    pub fn resolve_api_key(&self) -> Result<Option<String>> {
        let Some(env_var) = self.provider.api_key_env() else {
            return Ok(None);
        };

        if let Some(key) = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            debug!(provider = ?self.provider, "Using API key from settings");
            return Ok(Some(key.to_string()));
        }

        if let Some(file) = &self.api_key_file {
            let key = fs::read_to_string(file)
                .with_context(|| format!("Failed to read API key file {}", file.display()))?;
            let key = key.trim();
            if key.is_empty() {
                bail!("API key file {} is empty", file.display());
            }
            debug!(provider = ?self.provider, key_file = %file.display(), "Using API key from file");
            return Ok(Some(key.to_string()));
        }

        match std::env::var(env_var) {
            Ok(key) if !key.trim().is_empty() => {
                debug!(provider = ?self.provider, env_var, "Using API key from environment");
                Ok(Some(key.trim().to_string()))
            }
            _ => {
                error!(provider = ?self.provider, env_var, "No API key configured");
                Err(anyhow!(
                    "No API key for {:?}: set llm.api_key, llm.api_key_file, --api-key or {env_var}",
                    self.provider
                ))
            }
        }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from("docs")
}

fn default_docs_dir_name() -> String {
    "docs".to_string()
}

fn default_guide_dir() -> PathBuf {
    PathBuf::from("docguide")
}

pub fn default_patterns() -> Vec<String> {
    DEFAULT_IGNORE_PATTERNS.iter().map(|p| p.to_string()).collect()
}

impl Settings {
    /// Parse a settings document from a string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        Ok(settings)
    }

    /// `[mkdocs]` table converted for merging into `mkdocs.yml`.
    pub fn site_settings(&self) -> Result<Option<serde_yaml::Value>> {
        self.mkdocs
            .as_ref()
            .map(|table| serde_yaml::to_value(table).context("Failed to convert [mkdocs] table"))
            .transpose()
    }

    pub fn trace_loaded(&self) {
        info!(
            input_path = ?self.main.input_path,
            mkdocs_dir = %self.main.mkdocs_dir.display(),
            docs_dir_name = %self.main.docs_dir_name,
            provider = ?self.llm.provider,
            model = %self.llm.model(),
            ignore = ?self.ignore.patterns,
            project = %self.project.name,
            "Loaded settings"
        );
    }
}

/// Load the settings document at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow!("Failed to read config file {}: {e}", path_ref.display()));
        }
    };

    match Settings::from_toml(&config_content) {
        Ok(settings) => {
            info!(config_path = ?path_ref, "Parsed config TOML successfully");
            Ok(settings)
        }
        Err(e) => {
            error!(error = %e, config_path = ?path_ref, "Failed to parse config TOML");
            Err(e.context(format!("Invalid config file {}", path_ref.display())))
        }
    }
}
