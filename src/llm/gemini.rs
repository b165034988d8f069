//! Gemini `generateContent` client.

use super::{
    client::{ensure_success, http_client, require_api_key},
    types::*,
    VisionClient,
};
use crate::{Error, Result, config::ProviderConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const PROVIDER_NAME: &str = "Gemini";

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    /// Inline key only; the environment is consulted per request.
    api_key: Option<String>,
    api_key_env: String,
}

impl GeminiClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: config.base_url().to_string(),
            model: config.model().to_string(),
            api_key: config.api_key.clone(),
            api_key_env: config.api_key_env().to_string(),
        })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn build_request<'a>(&self, request: &'a VisionRequest) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: &request.prompt,
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: &request.image.media_type,
                            data: &request.image.data,
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
            },
        }
    }
}

#[async_trait]
impl VisionClient for GeminiClient {
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
            "Sending request to Gemini API"
        );

        let url = reqwest::Url::parse_with_params(&self.api_url(), &[("key", api_key.as_str())])
            .map_err(|e| Error::config(format!("Invalid Gemini URL: {}", e)))?;

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await?;

        debug!("Gemini API response status: {}", response.status());

        let response = ensure_success(PROVIDER_NAME, response).await?;
        let text = response.text().await?;
        let reply: GenerateContentResponse = serde_json::from_str(&text)?;

        Ok(reply.into_vision_response(&self.model))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl GenerateContentResponse {
    fn into_vision_response(self, requested_model: &str) -> VisionResponse {
        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().find_map(|part| part.text));

        VisionResponse {
            text,
            model: self
                .model_version
                .unwrap_or_else(|| requested_model.to_string()),
            usage: self.usage_metadata.map(|u| Usage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            }),
        }
    }
}
