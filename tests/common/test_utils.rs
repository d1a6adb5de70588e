use super::mocks::MockCompletionClient;
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use medibot::{
    Result,
    chat::{PromptTemplate, ResponseGenerator},
    config::{Config, Secrets},
    llm::SamplingParams,
    server::{AppState, router},
};
use secrecy::SecretString;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::fs;

/// Create a test configuration with sensible defaults
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.server.environment = "test".to_string();
    config.server.logs.level = "debug".to_string();
    config
}

pub fn with_token(mut config: Config, token: &str) -> Config {
    config.secrets = Secrets {
        huggingface_token: Some(SecretString::new(token.to_string())),
        ..Secrets::default()
    };
    config
}

/// Generator with a single primary model backed by `client`.
pub fn generator_with(client: Arc<MockCompletionClient>) -> ResponseGenerator {
    ResponseGenerator::new(SamplingParams::default()).with_model(
        "BioGPT-Large",
        PromptTemplate::default(),
        client,
    )
}

pub fn create_test_app(config: Config, generator: ResponseGenerator) -> Router {
    router(AppState::new(config, generator))
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Create a test config YAML file
pub async fn create_test_config_file(dir: &TempDir, content: &str) -> Result<String> {
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, content).await?;
    Ok(config_path.to_string_lossy().to_string())
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 8080
  environment: "staging"
  debug: true
  logs:
    level: "debug"

models:
  primary:
    name: "Mistral-7B-Instruct"
    repo: "mistralai/Mistral-7B-Instruct-v0.2"
    backend: "local"
    description: "Local instruction model"
    use_case: "Offline medical Q&A"
  fallback: null

sampling:
  max_length: 256
  temperature: 0.5
  top_p: 0.95
  do_sample: true

generation:
  embed_errors: true
  preload: false

hub:
  inference_url: "http://localhost:9999"

limits:
  max_message_length: 500
  rate_limit: "5 requests per minute"
"#;

/// Invalid configuration YAML for testing error cases
pub const INVALID_CONFIG_YAML: &str = r#"
server:
  port: "not-a-number"
"#;
