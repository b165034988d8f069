use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
};
use emotion_analyzer::{
    analyzer::EmotionAnalyzer,
    config::{PromptStyle, ProviderConfig, ProviderKind, ServerConfig},
    llm::VisionClient,
    server::{self, ANALYZE_PATH, handlers::AppState},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

/// A few bytes of JPEG header, base64 encoded
pub const SAMPLE_IMAGE: &str = "/9j/4AAQSkZJRgABAQAAAQABAAD/2wBDAAgGBgcGBQgHBwcJCQgKDBQNDAsLDBkSEw8UHRofHh0aHBwgJC4nICIsIxwcKDcpLDAxNDQ0Hyc5PTgyPC4zNDL/";

/// Provider config pointing at a mock server
pub fn create_provider_config(kind: ProviderKind, base_url: &str) -> ProviderConfig {
    ProviderConfig {
        kind,
        model: None,
        base_url: Some(base_url.to_string()),
        api_key: Some("test-api-key".to_string()),
        api_key_env: None,
        max_tokens: None,
        prompt: PromptStyle::Terse,
    }
}

pub fn create_app_with_client(client: Arc<dyn VisionClient>) -> Router {
    create_app(EmotionAnalyzer::new(client, PromptStyle::Terse, 50))
}

pub fn create_app(analyzer: EmotionAnalyzer) -> Router {
    create_app_with_config(analyzer, &ServerConfig::default())
}

pub fn create_app_with_config(analyzer: EmotionAnalyzer, config: &ServerConfig) -> Router {
    let state = AppState {
        analyzer: Arc::new(analyzer),
    };
    server::router(state, config).unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

pub async fn send(app: Router, method: Method, body: Body) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(ANALYZE_PATH)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&bytes).unwrap())
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn post_json(app: Router, body: Value) -> TestResponse {
    send(app, Method::POST, Body::from(body.to_string())).await
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 3000
  logs:
    level: "debug"
  cors:
    allow_origins:
      - "https://example.com"

provider:
  kind: "gemini"
  model: "gemini-2.0-flash"
  api_key_env: "MY_GEMINI_KEY"
  max_tokens: 20
  prompt: "verbose"
"#;

/// Invalid configuration YAML for testing error cases
pub const INVALID_CONFIG_YAML: &str = r#"
server:
  port: "not-a-number"

provider:
  kind: "openai"
"#;
