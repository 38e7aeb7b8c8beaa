//! # Generation backends
//!
//! Bridges the core [`Generator`] capability to real language-model APIs.
//! The backend is chosen once at startup from the `[llm]` settings and
//! shared by every generation task.
//!
//! - Gemini: `generateContent` REST endpoint, key in the query string.
//! - OpenAI: legacy completions endpoint with bearer auth.
//! - Ollama: local `/api/generate`, no credential.
//!
//! Transport errors, non-success statuses and malformed bodies are returned
//! as [`GenerateError`]; the dispatcher logs them per file.

use async_trait::async_trait;
use meowdoc_core::contract::{GenerateError, Generator};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::load_config::{LlmSection, ProviderKind};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

/// A configured backend.
#[derive(Debug, Clone)]
pub enum Provider {
    Gemini(GeminiClient),
    OpenAi(OpenAiClient),
    Ollama(OllamaClient),
}

impl Provider {
    /// Build the backend described by `llm`, resolving its credential.
    pub fn from_settings(llm: &LlmSection) -> anyhow::Result<Self> {
        let model = llm.model();
        let base_url = llm.base_url.as_deref().map(|u| u.trim_end_matches('/').to_string());
        let provider = match llm.provider {
            ProviderKind::Gemini => {
                let api_key = require_key(llm)?;
                Provider::Gemini(GeminiClient::new(
                    base_url.unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
                    model,
                    api_key,
                ))
            }
            ProviderKind::OpenAi => {
                let api_key = require_key(llm)?;
                Provider::OpenAi(OpenAiClient::new(
                    base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
                    model,
                    api_key,
                ))
            }
            ProviderKind::Ollama => {
                let Some(base_url) = base_url.filter(|u| !u.is_empty()) else {
                    anyhow::bail!("Base URL is required for Ollama (llm.base_url or --base-url)");
                };
                Provider::Ollama(OllamaClient::new(base_url, model))
            }
        };
        info!(provider = ?llm.provider, model = %llm.model(), "Initialized generation backend");
        Ok(provider)
    }
}

fn require_key(llm: &LlmSection) -> anyhow::Result<String> {
    llm.resolve_api_key()?
        .ok_or_else(|| anyhow::anyhow!("No API key for {:?}", llm.provider))
}

#[async_trait]
impl Generator for Provider {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        match self {
            Provider::Gemini(client) => client.generate(prompt).await,
            Provider::OpenAi(client) => client.generate(prompt).await,
            Provider::Ollama(client) => client.generate(prompt).await,
        }
    }
}

/// Send `body` as JSON and decode the JSON reply, failing on non-success statuses.
async fn post_json<B, R>(request: reqwest::RequestBuilder, body: &B, backend: &str) -> Result<R, GenerateError>
where
    B: Serialize + ?Sized,
    R: for<'de> Deserialize<'de>,
{
    let response = request.json(body).send().await.map_err(|e| {
        error!(backend, error = %e, "Request to backend failed");
        e
    })?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        error!(backend, %status, body = %text, "Backend returned an error status");
        return Err(format!("{backend} request failed: {status} - {text}").into());
    }

    let parsed = response.json::<R>().await.map_err(|e| {
        error!(backend, error = %e, "Failed to decode backend response");
        e
    })?;
    Ok(parsed)
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, prompt_len = prompt.len(), "Calling Gemini");
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        };
        let request = self.http.post(url).query(&[("key", self.api_key.as_str())]);
        let response: GeminiResponse = post_json(request, &body, "gemini").await?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or("Gemini response has no candidates")?;
        Ok(candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<String>())
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!("{}/v1/completions", self.base_url);
        debug!(model = %self.model, prompt_len = prompt.len(), "Calling OpenAI");
        let body = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: 500,
        };
        let request = self.http.post(url).bearer_auth(&self.api_key);
        let response: CompletionResponse = post_json(request, &body, "openai").await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or("OpenAI response has no choices")?;
        Ok(choice.text.trim().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_ctx: u32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!("{}/api/generate", self.base_url);
        debug!(model = %self.model, prompt_len = prompt.len(), "Calling Ollama");
        let body = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions { num_ctx: 4096 },
        };
        let response: OllamaResponse = post_json(self.http.post(url), &body, "ollama").await?;
        Ok(response.response)
    }
}
