use meowdoc::load_config::{load_config, ProviderKind, Settings};
use meowdoc_core::themes::Theme;
use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), content).unwrap();
    file
}

/// A full document maps every section onto typed settings.
#[test]
fn test_load_config_full_document() {
    let file = config_file(
        r#"
[main]
input_path = "src"
mkdocs_dir = "site"
docs_dir_name = "content"
create_mkdocs = true
theme = "dracula"
concurrency = 4

[ignore]
patterns = ["target", "*.lock"]

[project]
name = "My_Project"
description = "Does things."
repo_url = "https://example.com/repo"

[llm]
provider = "ollama"
model = "codellama"
base_url = "http://localhost:11434"

[mkdocs]
repo_name = "example/repo"

[mkdocs.theme]
palette = { scheme = "slate" }
"#,
    );

    let settings = load_config(file.path()).expect("Config should load");

    assert_eq!(settings.main.input_path, Some(PathBuf::from("src")));
    assert_eq!(settings.main.mkdocs_dir, PathBuf::from("site"));
    assert_eq!(settings.main.docs_dir_name, "content");
    assert!(settings.main.create_mkdocs);
    assert_eq!(settings.main.theme, Theme::Dracula);
    assert_eq!(settings.main.concurrency, Some(4));
    assert_eq!(settings.ignore.patterns, vec!["target", "*.lock"]);
    assert_eq!(settings.project.name, "My_Project");
    assert_eq!(settings.llm.provider, ProviderKind::Ollama);
    assert_eq!(settings.llm.model(), "codellama");

    let site = settings.site_settings().unwrap().expect("mkdocs table present");
    assert_eq!(site["repo_name"], serde_yaml::Value::from("example/repo"));
    assert_eq!(site["theme"]["palette"]["scheme"], serde_yaml::Value::from("slate"));
}

/// Optional sections and keys fall back to defaults.
#[test]
fn test_load_config_defaults() {
    let file = config_file("[main]\n[llm]\nprovider = \"gemini\"\n");

    let settings = load_config(file.path()).expect("Config should load");

    assert_eq!(settings.main.input_path, None);
    assert_eq!(settings.main.mkdocs_dir, PathBuf::from("docs"));
    assert_eq!(settings.main.docs_dir_name, "docs");
    assert!(!settings.main.create_mkdocs);
    assert_eq!(settings.main.theme, Theme::Material);
    assert_eq!(settings.main.guide_dir, PathBuf::from("docguide"));
    assert!(settings.ignore.patterns.contains(&"node_modules".to_string()));
    assert_eq!(settings.ignore.patterns.len(), 7);
    assert_eq!(settings.project.name, "");
    assert_eq!(settings.llm.model(), "gemini-2.0-flash");
    assert!(settings.site_settings().unwrap().is_none());
}

#[test]
fn test_load_config_errors_for_missing_file() {
    let err = load_config("/definitely/not/here/config.toml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_load_config_errors_for_invalid_toml() {
    let file = config_file("[main\ninput_path = ");
    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_load_config_requires_llm_section() {
    let file = config_file("[main]\ninput_path = \"src\"\n");
    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_load_config_rejects_unknown_provider() {
    let file = config_file("[main]\n[llm]\nprovider = \"clippy\"\n");
    assert!(load_config(file.path()).is_err());
}

fn llm(doc: &str) -> meowdoc::load_config::LlmSection {
    Settings::from_toml(&format!("[main]\n{doc}")).unwrap().llm
}

#[test]
#[serial]
fn test_explicit_api_key_wins() {
    env::set_var("GOOGLE_API_KEY", "from-env");
    let section = llm("[llm]\nprovider = \"gemini\"\napi_key = \"explicit\"\n");
    assert_eq!(section.resolve_api_key().unwrap().as_deref(), Some("explicit"));
    env::remove_var("GOOGLE_API_KEY");
}

#[test]
#[serial]
fn test_api_key_file_is_trimmed() {
    env::set_var("OPENAI_API_KEY", "from-env");
    let key_file = config_file("  sk-file-key\n");
    let section = llm(&format!(
        "[llm]\nprovider = \"openai\"\napi_key_file = {:?}\n",
        key_file.path().display().to_string()
    ));
    assert_eq!(section.resolve_api_key().unwrap().as_deref(), Some("sk-file-key"));
    env::remove_var("OPENAI_API_KEY");
}

#[test]
#[serial]
fn test_api_key_falls_back_to_environment() {
    env::set_var("GOOGLE_API_KEY", "from-env");
    let section = llm("[llm]\nprovider = \"gemini\"\n");
    assert_eq!(section.resolve_api_key().unwrap().as_deref(), Some("from-env"));
    env::remove_var("GOOGLE_API_KEY");
}

#[test]
#[serial]
fn test_missing_api_key_is_an_error() {
    env::remove_var("OPENAI_API_KEY");
    let section = llm("[llm]\nprovider = \"openai\"\n");
    let err = section.resolve_api_key().unwrap_err();
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

#[test]
#[serial]
fn test_ollama_needs_no_key() {
    let section = llm("[llm]\nprovider = \"ollama\"\nbase_url = \"http://localhost:11434\"\n");
    assert_eq!(section.resolve_api_key().unwrap(), None);
    assert_eq!(section.model(), "llama3");
}
