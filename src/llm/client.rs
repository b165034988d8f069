use super::{ClaudeClient, GeminiClient, types::*};
use crate::{
    Error, Result,
    config::{self, ProviderConfig, ProviderKind},
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Human readable provider name, used in error responses.
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    async fn describe_image(&self, request: VisionRequest) -> Result<VisionResponse>;
}

pub fn create_vision_client(config: &ProviderConfig) -> Result<Arc<dyn VisionClient>> {
    if config.resolve_api_key().is_none() {
        // Not fatal: requests fail with 500 until the key is provided.
        warn!(
            "{} is not set; analysis requests will fail until it is configured",
            config.api_key_env()
        );
    }

    let client: Arc<dyn VisionClient> = match config.kind {
        ProviderKind::Claude => Arc::new(ClaudeClient::new(config)?),
        ProviderKind::Gemini => Arc::new(GeminiClient::new(config)?),
    };

    debug!(
        "Created {} client for model {}",
        client.name(),
        client.model()
    );

    Ok(client)
}

pub(crate) fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()?)
}

/// Inline key, else `env_var` as it is at call time.
pub(crate) fn require_api_key(inline: Option<&str>, env_var: &str) -> Result<String> {
    config::resolve_api_key(inline, env_var).ok_or_else(|| Error::MissingApiKey {
        env_var: env_var.to_string(),
    })
}

/// Turns a non-2xx reply into [`Error::Upstream`] carrying the raw body.
pub(crate) async fn ensure_success(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!("{} API error {}: {}", provider, status, body);

    Err(Error::Upstream {
        provider: provider.to_string(),
        status,
        body,
    })
}
