mod claude;
mod client;
mod gemini;
mod types;

pub use claude::ClaudeClient;
pub use client::{VisionClient, create_vision_client};
pub use gemini::GeminiClient;
pub use types::*;
