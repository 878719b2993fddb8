//! Answer Backend Traits
//!
//! Trait definition for the LCA answer-generation service. This abstraction
//! lets the session controller run against the real HTTP endpoint, a mock in
//! tests, or any other transport without changing core logic.
//!
//! # Wire Contract
//!
//! One request per query:
//!
//! ```json
//! { "query": "What is LCA?", "model": "flan" }
//! ```
//!
//! The reply is a JSON object with an optional `answer` string and an
//! optional `sources` list. Anything that is not such an object is reported
//! as [`BackendError::Malformed`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ModelId;

/// Request body for the chat endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's question
    pub query: String,
    /// Model that should answer it
    pub model: ModelId,
}

impl ChatRequest {
    /// Create a new request
    pub fn new(query: impl Into<String>, model: ModelId) -> Self {
        Self {
            query: query.into(),
            model,
        }
    }
}

/// Response body from the chat endpoint
///
/// Every field is optional: a well-formed reply may still carry no answer,
/// which the lifecycle manager turns into the fallback message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated answer text
    #[serde(default)]
    pub answer: Option<String>,
    /// Citation labels for the answer
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    /// Error reported by the backend in a 2xx body (e.g. unknown model)
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatResponse {
    /// Parse a reply body
    ///
    /// Only a JSON object is accepted. A derived struct decoder would also
    /// take the sequence form (`["x"]`), so the shape is checked first.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Malformed`] for invalid JSON, a non-object
    /// value or a field of the wrong type.
    pub fn from_json(body: &str) -> Result<Self, BackendError> {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| BackendError::Malformed(e.to_string()))?;
        if !value.is_object() {
            return Err(BackendError::Malformed("expected a JSON object".into()));
        }
        serde_json::from_value(value).map_err(|e| BackendError::Malformed(e.to_string()))
    }

    /// Response with an answer and no sources
    pub fn answer(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(answer.into()),
            ..Self::default()
        }
    }

    /// Attach citation labels
    #[must_use]
    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = Some(sources.into_iter().map(Into::into).collect());
        self
    }
}

/// Failures of a single backend round trip
///
/// The `Display` text is the bare diagnostic; the lifecycle manager adds the
/// user-facing prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Network-level failure (connection refused, DNS, reset, ...)
    #[error("{0}")]
    Transport(String),

    /// Non-2xx HTTP status
    #[error("Backend returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (possibly empty)
        body: String,
    },

    /// Body was not the expected JSON object
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// No response within the configured bound
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The backend implementation panicked during the call
    #[error("backend panicked: {0}")]
    Panicked(String),

    /// HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

/// Answer backend trait
///
/// Implement this trait to plug in a different transport.
#[async_trait]
pub trait AnswerBackend: Send + Sync {
    /// Get the backend name (e.g., "HTTP")
    fn name(&self) -> &str;

    /// Perform one chat round trip
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError>;
}

#[async_trait]
impl<T: AnswerBackend + ?Sized> AnswerBackend for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        (**self).chat(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_wire_format() {
        let request = ChatRequest::new("What is LCA?", ModelId::Llama);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "query": "What is LCA?", "model": "llama" })
        );
    }

    #[test]
    fn test_response_parsing() {
        let full: ChatResponse =
            serde_json::from_str(r#"{"answer": "LCA is...", "sources": ["ISO 14040"]}"#).unwrap();
        assert_eq!(
            full,
            ChatResponse::answer("LCA is...").with_sources(["ISO 14040"])
        );

        let empty: ChatResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ChatResponse::default());

        let error: ChatResponse = serde_json::from_str(r#"{"error": "Invalid model"}"#).unwrap();
        assert_eq!(error.error.as_deref(), Some("Invalid model"));
        assert!(error.answer.is_none());
    }

    #[test]
    fn test_response_wrong_shape_is_rejected() {
        for body in [r#"["answer"]"#, "[]", "\"answer\"", "42", "null", r#"{"answer": 42}"#] {
            let err = ChatResponse::from_json(body).unwrap_err();
            assert!(matches!(err, BackendError::Malformed(_)), "{body}: {err:?}");
        }
        assert_eq!(
            ChatResponse::from_json("[]").unwrap_err(),
            BackendError::Malformed("expected a JSON object".to_string())
        );
    }

    #[test]
    fn test_response_from_json_accepts_objects() {
        assert_eq!(ChatResponse::from_json("{}").unwrap(), ChatResponse::default());
        assert_eq!(
            ChatResponse::from_json(r#"{"answer": "LCA is...", "extra": true}"#).unwrap(),
            ChatResponse::answer("LCA is...")
        );
    }

    #[test]
    fn test_error_display_is_bare_diagnostic() {
        assert_eq!(
            BackendError::Transport("network down".to_string()).to_string(),
            "network down"
        );
        assert_eq!(
            BackendError::Timeout(Duration::from_secs(30)).to_string(),
            "request timed out after 30s"
        );
        assert_eq!(
            BackendError::Status {
                status: 502,
                body: "Bad Gateway".to_string()
            }
            .to_string(),
            "Backend returned 502: Bad Gateway"
        );
    }
}
