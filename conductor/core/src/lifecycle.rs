//! Request Lifecycle
//!
//! Performs exactly one backend round trip and turns its outcome into a bot
//! [`Turn`]. Failures never escape this module: a transport error, a bad
//! status, a malformed body or a timeout all become a turn the user can read,
//! so the session stays usable after any single request.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;

use crate::backend::{AnswerBackend, BackendError, ChatRequest, ChatResponse};
use crate::messages::Turn;
use crate::models::ModelId;

/// Content of the bot turn when the backend answered without an answer
pub const FALLBACK_ANSWER: &str = "Sorry, no answer received.";

/// Prefix of the bot turn when the round trip failed
pub const ERROR_PREFIX: &str = "Error fetching response: ";

/// Default bound on a single backend round trip
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Issues backend requests and converts outcomes into turns
pub struct RequestLifecycle<B: AnswerBackend> {
    backend: Arc<B>,
    timeout: Duration,
}

impl<B: AnswerBackend> Clone for RequestLifecycle<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            timeout: self.timeout,
        }
    }
}

impl<B: AnswerBackend> RequestLifecycle<B> {
    /// Create a lifecycle manager with the given per-request bound
    pub fn new(backend: Arc<B>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// Per-request bound
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the backend
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Run one round trip for `query` against `model`
    ///
    /// Never fails; every outcome produces a bot turn. Callers must not run
    /// two dispatches of the same session concurrently.
    pub async fn dispatch(&self, query: &str, model: ModelId) -> Turn {
        let request = ChatRequest::new(query, model);
        let start = Instant::now();

        // A panicking backend still settles the turn.
        let call = AssertUnwindSafe(self.backend.chat(&request)).catch_unwind();
        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(payload)) => Err(BackendError::Panicked(panic_message(&*payload))),
            Err(_) => Err(BackendError::Timeout(self.timeout)),
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            Ok(response) => {
                if let Some(ref error) = response.error {
                    tracing::warn!(
                        backend = self.backend.name(),
                        model = %model,
                        error = %error,
                        "Backend reported an error instead of an answer"
                    );
                }
                tracing::info!(
                    backend = self.backend.name(),
                    model = %model,
                    elapsed_ms,
                    "Backend responded"
                );
            }
            Err(e) => {
                tracing::warn!(
                    backend = self.backend.name(),
                    model = %model,
                    elapsed_ms,
                    error = %e,
                    "Backend request failed"
                );
            }
        }

        settle_turn(outcome)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Map a round-trip outcome to the bot turn shown to the user
///
/// - non-empty `answer`: that text, with the backend's sources (or none)
/// - missing or empty `answer`: [`FALLBACK_ANSWER`], no sources
/// - failure: [`ERROR_PREFIX`] followed by the diagnostic, no sources
pub fn settle_turn(outcome: Result<ChatResponse, BackendError>) -> Turn {
    match outcome {
        Ok(ChatResponse {
            answer: Some(answer),
            sources,
            ..
        }) if !answer.is_empty() => Turn::bot(answer, sources.unwrap_or_default()),
        Ok(_) => Turn::bot(FALLBACK_ANSWER, Vec::new()),
        Err(e) => Turn::bot(format!("{ERROR_PREFIX}{e}"), Vec::new()),
    }
}
