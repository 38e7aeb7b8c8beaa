//! # meowdoc CLI interface
//!
//! Argument parsing, settings overrides and orchestration of one run. All
//! pipeline logic lives in [`meowdoc_core`]; this module only wires the
//! settings document, the chosen backend and the site scaffold together.
//!
//! For programmatic and integration use, call [`run`] with a constructed
//! [`Cli`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use meowdoc_core::config::PipelineConfig;
use meowdoc_core::contract::GenerationReport;
use meowdoc_core::ignore::IgnoreRules;
use meowdoc_core::index::ProjectInfo;
use meowdoc_core::pipeline;
use meowdoc_core::scaffold::ensure_project;
use meowdoc_core::site_config::SiteConfig;
use meowdoc_core::themes::Theme;
use tracing::{error, info, warn};

use crate::interactive::prompt_settings;
use crate::load_config::{load_config, ProviderKind, Settings};
use crate::provider::Provider;

/// Generate MkDocs documentation for a source tree with a language model.
#[derive(Parser, Debug, Clone)]
#[clap(name = "meowdoc", version, about = "Generate documentation using LLMs and MkDocs")]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Source file or directory to document
    pub input_path: Option<PathBuf>,

    /// Create the MkDocs project if it doesn't exist
    #[clap(long)]
    pub create_mkdocs: bool,

    /// Directory of the MkDocs project
    #[clap(long)]
    pub mkdocs_dir: Option<PathBuf>,

    /// Name of the docs directory inside the MkDocs project
    #[clap(long)]
    pub docs_dir_name: Option<String>,

    /// Prompt for settings on the terminal
    #[clap(long)]
    pub interactive: bool,

    /// Ignore patterns (e.g. .venv venv node_modules)
    #[clap(long, num_args = 1..)]
    pub ignore: Option<Vec<String>>,

    /// LLM provider
    #[clap(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// API key for the LLM provider
    #[clap(long)]
    pub api_key: Option<String>,

    /// Base URL for the provider (required for Ollama)
    #[clap(long)]
    pub base_url: Option<String>,

    /// Model name for the LLM provider
    #[clap(long)]
    pub model: Option<String>,

    /// Maximum number of generations in flight
    #[clap(long)]
    pub concurrency: Option<usize>,

    /// Site theme (default, dracula or material)
    #[clap(long)]
    pub theme: Option<Theme>,
}

impl Cli {
    /// Apply command-line values on top of the settings document.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(input) = &self.input_path {
            settings.main.input_path = Some(input.clone());
        }
        if self.create_mkdocs {
            settings.main.create_mkdocs = true;
        }
        if let Some(dir) = &self.mkdocs_dir {
            settings.main.mkdocs_dir = dir.clone();
        }
        if let Some(name) = &self.docs_dir_name {
            settings.main.docs_dir_name = name.clone();
        }
        if let Some(patterns) = self.ignore.as_ref().filter(|p| !p.is_empty()) {
            settings.ignore.patterns = patterns.clone();
        }
        if let Some(provider) = self.provider {
            settings.llm.provider = provider;
        }
        if let Some(key) = &self.api_key {
            settings.llm.api_key = Some(key.clone());
        }
        if let Some(url) = &self.base_url {
            settings.llm.base_url = Some(url.clone());
        }
        if let Some(model) = &self.model {
            settings.llm.model = Some(model.clone());
        }
        if let Some(n) = self.concurrency {
            settings.main.concurrency = Some(n);
        }
        if let Some(theme) = self.theme {
            settings.main.theme = theme;
        }
    }
}

/// Turn validated settings into a pipeline configuration.
pub fn pipeline_config(settings: &Settings) -> Result<PipelineConfig> {
    let Some(input_path) = settings.main.input_path.clone() else {
        bail!("No input path given: pass it on the command line or set main.input_path");
    };
    if !input_path.exists() {
        bail!("Input path {} does not exist", input_path.display());
    }
    let ignore = IgnoreRules::new(&settings.ignore.patterns).context("Invalid ignore pattern")?;

    Ok(PipelineConfig {
        input_path,
        project_dir: settings.main.mkdocs_dir.clone(),
        docs_dir_name: settings.main.docs_dir_name.clone(),
        ignore,
        project: ProjectInfo::from(&settings.project),
        theme: Some(settings.main.theme),
        guide_dir: settings.main.guide_dir.clone(),
        concurrency: settings.main.concurrency,
        site_settings: settings.site_settings()?,
        write_index: true,
    })
}

/// Scaffold the site when asked to, or when the project or its content dir is missing.
fn prepare_site(config: &PipelineConfig, create_requested: bool) -> Result<()> {
    let missing = !SiteConfig::path_in(&config.project_dir).is_file() || !config.content_dir().is_dir();
    if create_requested || missing {
        info!(project_dir = %config.project_dir.display(), "Checking for existing MkDocs project");
        ensure_project(&config.project_dir).context("Failed to create MkDocs project")?;
    }
    Ok(())
}

fn print_summary(report: &GenerationReport, config: &PipelineConfig) {
    println!(
        "Generated {} page(s), {} failed, {} auxiliary page(s)",
        report.artifacts.len(),
        report.failed.len(),
        report.pages.len()
    );
    for failed in &report.failed {
        println!("  no docs for {failed}");
    }
    if report.nav_updated {
        println!("Updated {}", SiteConfig::path_in(&config.project_dir).display());
    }
    if let Some(package) = config.theme.and_then(|t| t.package_name()) {
        println!("Theme needs the `{package}` package (pip install {package})");
    }
}

/// Async entrypoint used by `main` and the integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    info!("trace_initialised");

    let mut settings = load_config(&cli.config)?;
    cli.apply_overrides(&mut settings);
    if cli.interactive {
        prompt_settings(&mut settings)?;
    }
    settings.trace_loaded();

    let provider = Provider::from_settings(&settings.llm)?;
    let config = pipeline_config(&settings)?;
    prepare_site(&config, settings.main.create_mkdocs)?;

    match pipeline::run(&config, Arc::new(provider)).await {
        Ok(report) => {
            info!(?report, "Documentation run complete");
            if report.artifacts.is_empty() {
                warn!("No documentation was generated");
            }
            print_summary(&report, &config);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Documentation run failed");
            Err(anyhow::Error::new(e).context("Documentation run failed"))
        }
    }
}
