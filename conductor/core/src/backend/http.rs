//! HTTP Backend Implementation
//!
//! Talks to the LCA question-answering service over its JSON chat endpoint
//! (`POST /chat`). The service runs retrieval plus generation with the model
//! named in the request and replies with `{"answer": ...}`.

use std::time::Duration;

use async_trait::async_trait;

use super::traits::{AnswerBackend, BackendError, ChatRequest, ChatResponse};

/// Default chat endpoint of a locally running backend
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/chat";

/// Time allowed to establish the TCP connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP answer backend
#[derive(Clone, Debug)]
pub struct HttpBackend {
    /// Full URL of the chat endpoint
    endpoint: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend for the given chat endpoint URL
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Client`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            http_client,
        })
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnswerBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "HTTP"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        // Check for HTTP errors
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        ChatResponse::from_json(&body)
    }
}
