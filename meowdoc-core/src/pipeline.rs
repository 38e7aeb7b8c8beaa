//! High-level pipeline: orchestrates collect → generate → write → navigate.
//!
//! This module provides the top-level orchestration for one documentation
//! run as described by a [`PipelineConfig`]:
//!   - Collects the corpus from the input path, honouring ignore rules
//!   - Dispatches one generation per file through an injected [`Generator`]
//!     and writes each page as soon as its result arrives
//!   - Processes auxiliary guide pages alongside the generation phase
//!   - Writes the landing page and merges every produced page into `mkdocs.yml`
//!
//! # Error Handling
//! Per-file failures are logged and reported in [`GenerationReport::failed`];
//! they never stop the run. Only a missing input path and navigation merge
//! failures are returned as errors. Pages already written are kept when the
//! merge fails.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::contract::{Artifact, GenerationReport, Generator};
use crate::corpus;
use crate::dispatch::{dispatch, DispatchOptions, Outcome};
use crate::error::{Error, Result};
use crate::index::{create_project_index, INDEX_PAGE};
use crate::nav::{update_navigation, NavUpdate};
use crate::pages::process_pages;
use crate::writer::{plan_pages, write_artifact};

/// Run the whole pipeline for `config` using `generator`.
pub async fn run<G>(config: &PipelineConfig, generator: Arc<G>) -> Result<GenerationReport>
where
    G: Generator + 'static,
{
    info!("[RUN] Starting documentation pipeline");
    config.trace_loaded();

    let content_dir = config.content_dir();
    let exclude = vec![config.project_dir.clone(), content_dir.clone()];
    let corpus = Arc::new(corpus::collect(&config.input_path, &config.ignore, &exclude)?);
    if corpus.is_empty() {
        warn!(input = %config.input_path.display(), "[RUN] No files to document");
    }

    std::fs::create_dir_all(&content_dir).map_err(|e| Error::io(&content_dir, e))?;

    let plan = plan_pages(corpus.keys());
    let options = DispatchOptions {
        guide_dir: Some(config.guide_dir.clone()),
        concurrency: config.concurrency,
    };

    let mut report = GenerationReport::default();
    let generation = dispatch(Arc::clone(&corpus), Arc::clone(&generator), &options, |outcome| {
        record_outcome(&content_dir, &plan, outcome, &mut report)
    });
    let pages_dir = config.pages_dir();
    let pages = process_pages(&pages_dir, &content_dir, Arc::clone(&generator));
    let ((), pages) = tokio::join!(generation, pages);
    report.pages = pages;
    report.artifacts.sort_by(|a, b| a.source.cmp(&b.source));
    report.failed.sort();

    info!(
        written = report.artifacts.len(),
        failed = report.failed.len(),
        pages = report.pages.len(),
        "[RUN] Generation finished"
    );

    if config.write_index {
        let index_path = content_dir.join(INDEX_PAGE);
        let produced = report.artifacts.iter().any(|a| a.output == index_path)
            || report.pages.iter().any(|p| p == INDEX_PAGE);
        if produced {
            warn!(path = %index_path.display(), "[RUN] index.md was produced by this run, not replacing it with the landing page");
        } else if let Err(e) = create_project_index(&content_dir, &config.project, generator.as_ref()).await {
            error!(error = %e, "[RUN] Failed to write index page");
        }
    }

    let mut outputs: Vec<PathBuf> = report.artifacts.iter().map(|a| a.output.clone()).collect();
    if corpus.single_file {
        if !report.pages.is_empty() {
            info!(pages = report.pages.len(), "[RUN] Auxiliary pages are not added to nav in single-file mode");
        }
    } else {
        outputs.extend(report.pages.iter().map(|p| content_dir.join(p)));
    }

    if outputs.is_empty() {
        warn!("[RUN] Nothing was generated, leaving site configuration untouched");
        return Ok(report);
    }

    let update = NavUpdate {
        project_dir: &config.project_dir,
        content_dir: &content_dir,
        outputs: &outputs,
        single_file: corpus.single_file,
        site_name: Some(config.project.name.as_str()),
        theme: config.theme,
        settings: config.site_settings.as_ref(),
    };
    if let Err(e) = update_navigation(&update) {
        error!(error = %e, "[RUN] Navigation merge failed; generated pages are kept");
        return Err(e);
    }
    report.nav_updated = true;

    info!("[RUN] All docs generated");
    Ok(report)
}

fn record_outcome(
    content_dir: &Path,
    plan: &BTreeMap<String, String>,
    outcome: Outcome,
    report: &mut GenerationReport,
) {
    let Outcome { source, text } = outcome;
    let written = text.and_then(|text| {
        let page = plan.get(&source.relative)?;
        write_artifact(content_dir, page, &text)
    });
    match written {
        Some(output) => report.artifacts.push(Artifact {
            source: source.relative,
            output,
        }),
        None => {
            error!(relative = %source.relative, "[RUN] No docs for file");
            report.failed.push(source.relative);
        }
    }
}
