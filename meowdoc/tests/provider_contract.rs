use meowdoc::load_config::Settings;
use meowdoc::provider::{GeminiClient, OllamaClient, OpenAiClient, Provider};
use meowdoc_core::contract::Generator;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn ollama_posts_generate_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(json!({
            "model": "llama3",
            "prompt": "document this",
            "stream": false,
            "options": {"num_ctx": 4096}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "# Docs"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri(), "llama3");
    assert_eq!(client.generate("document this").await.unwrap(), "# Docs");
}

#[tokio::test]
async fn gemini_concatenates_candidate_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "secret"))
        .and(body_json(json!({"contents": [{"parts": [{"text": "hello"}]}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                {"content": {"parts": [{"text": "# Title\n"}, {"text": "Body"}]}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(server.uri(), "gemini-2.0-flash", "secret");
    assert_eq!(client.generate("hello").await.unwrap(), "# Title\nBody");
}

#[tokio::test]
async fn gemini_without_candidates_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let client = GeminiClient::new(server.uri(), "gemini-2.0-flash", "secret");
    assert!(client.generate("hello").await.is_err());
}

#[tokio::test]
async fn openai_uses_bearer_auth_and_trims_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "model": "gpt-3.5-turbo-instruct",
            "prompt": "explain",
            "max_tokens": 500
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"choices": [{"text": "\n\n# Explained\n"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(server.uri(), "gpt-3.5-turbo-instruct", "sk-test");
    assert_eq!(client.generate("explain").await.unwrap(), "# Explained");
}

#[tokio::test]
async fn error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri(), "llama3");
    let err = client.generate("x").await.unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn malformed_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(server.uri(), "gpt-3.5-turbo-instruct", "sk-test");
    assert!(client.generate("x").await.is_err());
}

#[tokio::test]
async fn provider_from_settings_targets_configured_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let settings = Settings::from_toml(&format!(
        "[main]\n[llm]\nprovider = \"ollama\"\nbase_url = \"{}/\"\n",
        server.uri()
    ))
    .unwrap();
    let provider = Provider::from_settings(&settings.llm).unwrap();
    assert!(matches!(provider, Provider::Ollama(_)));
    assert_eq!(provider.generate("x").await.unwrap(), "ok");
}

#[test]
fn ollama_without_base_url_is_rejected() {
    let settings = Settings::from_toml("[main]\n[llm]\nprovider = \"ollama\"\n").unwrap();
    assert!(Provider::from_settings(&settings.llm).is_err());
}
