use serde::{Deserialize, Serialize};

pub const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// Base64 image data plus the media type it is sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub media_type: String,
    pub data: String,
}

impl ImagePayload {
    /// Accepts raw base64 or a `data:<mime>;base64,` URL. Raw input is
    /// assumed to be JPEG.
    pub fn from_base64(input: &str) -> Self {
        if let Some((media_type, data)) = input
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .filter(|(media_type, _)| !media_type.is_empty())
        {
            return Self {
                media_type: media_type.to_string(),
                data: data.to_string(),
            };
        }

        Self {
            media_type: DEFAULT_MEDIA_TYPE.to_string(),
            data: input.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub image: ImagePayload,
    pub prompt: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct VisionResponse {
    /// First text segment of the reply, untrimmed.
    pub text: Option<String>,
    pub model: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}
