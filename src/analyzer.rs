use crate::{
    Error, Result,
    config::{PromptStyle, ProviderConfig},
    emotion::{self, Emotion},
    llm::{ImagePayload, VisionClient, VisionRequest, create_vision_client},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Classifies the facial expression in an image through a [`VisionClient`].
pub struct EmotionAnalyzer {
    client: Arc<dyn VisionClient>,
    prompt: PromptStyle,
    max_tokens: u32,
}

impl EmotionAnalyzer {
    pub fn new(client: Arc<dyn VisionClient>, prompt: PromptStyle, max_tokens: u32) -> Self {
        Self {
            client,
            prompt,
            max_tokens,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let client = create_vision_client(config)?;
        Ok(Self::new(client, config.prompt, config.max_tokens()))
    }

    pub fn provider_name(&self) -> &str {
        self.client.name()
    }

    /// Returns the trimmed label, `不明` when the provider gave no text.
    pub async fn analyze(&self, image_data: &str) -> Result<String> {
        if image_data.is_empty() {
            return Err(Error::MissingImage);
        }

        info!(
            "Analyzing image ({} bytes of base64) with {}",
            image_data.len(),
            self.client.name()
        );

        let request = VisionRequest {
            image: ImagePayload::from_base64(image_data),
            prompt: emotion::prompt(self.prompt).to_string(),
            max_tokens: self.max_tokens,
        };

        let response = self.client.describe_image(request).await?;

        if let Some(usage) = response.usage {
            debug!(
                "{} usage: {} input tokens, {} output tokens",
                response.model, usage.input_tokens, usage.output_tokens
            );
        }

        let label = emotion::label_from_reply(response.text.as_deref());
        if Emotion::from_label(&label).is_none() {
            warn!("Provider reply is outside the label set: {}", label);
        }

        info!("Detected emotion: {}", label);
        Ok(label)
    }
}
