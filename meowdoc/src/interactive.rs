//! Interactive mode: asks for the values a run needs, pre-filled from settings.

use std::path::PathBuf;

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use tracing::info;

use crate::load_config::{default_patterns, Settings};

/// Prompt on the terminal and write the answers back into `settings`.
pub fn prompt_settings(settings: &mut Settings) -> Result<()> {
    info!("Running in interactive mode");
    let theme = ColorfulTheme::default();

    let current_input = settings
        .main
        .input_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let input_path: String = Input::with_theme(&theme)
        .with_prompt("Input path (file or directory)")
        .with_initial_text(current_input)
        .interact_text()?;
    settings.main.input_path = Some(PathBuf::from(input_path.trim()));

    let model: String = Input::with_theme(&theme)
        .with_prompt("Model")
        .default(settings.llm.model())
        .interact_text()?;
    settings.llm.model = Some(model.trim().to_string());

    settings.main.create_mkdocs = Confirm::with_theme(&theme)
        .with_prompt("Create MkDocs project if it doesn't exist?")
        .default(settings.main.create_mkdocs)
        .interact()?;

    let mkdocs_dir: String = Input::with_theme(&theme)
        .with_prompt("MkDocs project directory")
        .default(settings.main.mkdocs_dir.display().to_string())
        .interact_text()?;
    settings.main.mkdocs_dir = PathBuf::from(mkdocs_dir.trim());

    let docs_dir_name: String = Input::with_theme(&theme)
        .with_prompt("Docs directory name")
        .default(settings.main.docs_dir_name.clone())
        .interact_text()?;
    settings.main.docs_dir_name = docs_dir_name.trim().to_string();

    let ignore: String = Input::with_theme(&theme)
        .with_prompt("Ignore patterns, comma separated (empty for defaults)")
        .allow_empty(true)
        .interact_text()?;
    settings.ignore.patterns = parse_patterns(&ignore);

    Ok(())
}

/// Split a comma-separated answer; an empty answer means the defaults.
pub fn parse_patterns(answer: &str) -> Vec<String> {
    let patterns: Vec<String> = answer
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    if patterns.is_empty() {
        default_patterns()
    } else {
        patterns
    }
}
