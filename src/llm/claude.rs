//! Anthropic Messages API client.

use super::{
    client::{ensure_success, http_client, require_api_key},
    types::*,
    VisionClient,
};
use crate::{Result, config::ProviderConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROVIDER_NAME: &str = "Claude";

pub struct ClaudeClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    /// Inline key only; the environment is consulted per request.
    api_key: Option<String>,
    api_key_env: String,
}

impl ClaudeClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: config.base_url().to_string(),
            model: config.model().to_string(),
            api_key: config.api_key.clone(),
            api_key_env: config.api_key_env().to_string(),
        })
    }

    fn build_request<'a>(&'a self, request: &'a VisionRequest) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentBlock::Image {
                        source: ImageSource {
                            source_type: "base64",
                            media_type: &request.image.media_type,
                            data: &request.image.data,
                        },
                    },
                    ContentBlock::Text {
                        text: &request.prompt,
                    },
                ],
            }],
        }
    }
}

#[async_trait]
impl VisionClient for ClaudeClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn describe_image(&self, request: VisionRequest) -> Result<VisionResponse> {
        let api_key = require_api_key(self.api_key.as_deref(), &self.api_key_env)?;
        let body = self.build_request(&request);

        debug!(
            model = %self.model,
            image_len = request.image.data.len(),
            "Sending request to Claude API"
        );

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key.as_str())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        debug!("Claude API response status: {}", response.status());

        let response = ensure_success(PROVIDER_NAME, response).await?;
        let text = response.text().await?;
        let reply: MessagesResponse = serde_json::from_str(&text)?;

        Ok(reply.into_vision_response(&self.model))
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock<'a> {
    Image { source: ImageSource<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    source_type: &'a str,
    media_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<MessagesUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl MessagesResponse {
    fn into_vision_response(self, requested_model: &str) -> VisionResponse {
        let text = self.content.into_iter().find_map(|block| match block {
            ResponseBlock::Text { text } => Some(text),
            ResponseBlock::Other => None,
        });

        VisionResponse {
            text,
            model: self.model.unwrap_or_else(|| requested_model.to_string()),
            usage: self.usage.map(|u| Usage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn create_test_client() -> ClaudeClient {
        ClaudeClient::new(&ProviderConfig {
            api_key: Some("test-api-key".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    fn create_test_request() -> VisionRequest {
        VisionRequest {
            image: ImagePayload::from_base64("aGVsbG8="),
            prompt: "表情を答えてください".to_string(),
            max_tokens: 50,
        }
    }

    #[test]
    fn test_request_body_shape() {
        let client = create_test_client();
        let request = create_test_request();

        let body = serde_json::to_value(client.build_request(&request)).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "claude-3-5-haiku-20241022",
                "max_tokens": 50,
                "messages": [{
                    "role": "user",
                    "content": [
                        {
                            "type": "image",
                            "source": {
                                "type": "base64",
                                "media_type": "image/jpeg",
                                "data": "aGVsbG8="
                            }
                        },
                        {
                            "type": "text",
                            "text": "表情を答えてください"
                        }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_first_text_block_is_extracted() {
        let reply: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_123",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-haiku-20241022",
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": " 笑っている\n"},
                {"type": "text", "text": "second"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 1200, "output_tokens": 8}
        }))
        .unwrap();

        let response = reply.into_vision_response("fallback-model");
        assert_eq!(response.text.as_deref(), Some(" 笑っている\n"));
        assert_eq!(response.model, "claude-3-5-haiku-20241022");
        assert_eq!(
            response.usage,
            Some(Usage {
                input_tokens: 1200,
                output_tokens: 8
            })
        );
    }

    #[test]
    fn test_empty_content_has_no_text() {
        let reply: MessagesResponse = serde_json::from_value(json!({"content": []})).unwrap();

        let response = reply.into_vision_response("claude-3-5-haiku-20241022");
        assert_eq!(response.text, None);
        assert_eq!(response.model, "claude-3-5-haiku-20241022");
        assert!(response.usage.is_none());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_sending() {
        let client = ClaudeClient::new(&ProviderConfig {
            api_key_env: Some("EMOTION_ANALYZER_TEST_UNSET_VAR".to_string()),
            // Unroutable; the request must never be sent.
            base_url: Some("http://127.0.0.1:9".to_string()),
            ..Default::default()
        })
        .unwrap();

        let err = client
            .describe_image(create_test_request())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingApiKey { .. }));
    }
}
