use async_trait::async_trait;
use axum::http::StatusCode;
use emotion_analyzer::{
    Error, Result,
    llm::{Usage, VisionClient, VisionRequest, VisionResponse},
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockBehaviour {
    Reply(Option<String>),
    Upstream(StatusCode, String),
    MissingKey,
    Panic,
}

/// Mock vision client for testing
#[derive(Debug, Clone)]
pub struct MockVisionClient {
    pub behaviour: MockBehaviour,
    pub requests: Arc<Mutex<Vec<VisionRequest>>>,
}

impl MockVisionClient {
    pub fn replying(text: &str) -> Self {
        Self::with_behaviour(MockBehaviour::Reply(Some(text.to_string())))
    }

    pub fn silent() -> Self {
        Self::with_behaviour(MockBehaviour::Reply(None))
    }

    pub fn failing(status: StatusCode, body: &str) -> Self {
        Self::with_behaviour(MockBehaviour::Upstream(status, body.to_string()))
    }

    pub fn without_key() -> Self {
        Self::with_behaviour(MockBehaviour::MissingKey)
    }

    pub fn panicking() -> Self {
        Self::with_behaviour(MockBehaviour::Panic)
    }

    pub fn with_behaviour(behaviour: MockBehaviour) -> Self {
        Self {
            behaviour,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_requests(&self) -> Vec<VisionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionClient for MockVisionClient {
    fn name(&self) -> &str {
        "Mock"
    }

    fn model(&self) -> &str {
        "mock-vision-1"
    }

    async fn describe_image(&self, request: VisionRequest) -> Result<VisionResponse> {
        self.requests.lock().unwrap().push(request);

        match &self.behaviour {
            MockBehaviour::Reply(text) => Ok(VisionResponse {
                text: text.clone(),
                model: "mock-vision-1".to_string(),
                usage: Some(Usage {
                    input_tokens: 10,
                    output_tokens: 2,
                }),
            }),
            MockBehaviour::Upstream(status, body) => Err(Error::Upstream {
                provider: "Mock".to_string(),
                status: *status,
                body: body.clone(),
            }),
            MockBehaviour::MissingKey => Err(Error::MissingApiKey {
                env_var: "MOCK_API_KEY".to_string(),
            }),
            MockBehaviour::Panic => panic!("mock provider exploded"),
        }
    }
}
