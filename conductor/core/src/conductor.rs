//! Session Controller - The Orchestration Core
//!
//! The controller owns one conversation: the ordered message log, the
//! selected model and the single outstanding backend request. Surfaces
//! drive it through [`SessionController::submit_query`] and
//! [`SessionController::set_model`], and observe it through read views and
//! the [`SessionUpdate`] stream.
//!
//! # State Machine
//!
//! ```text
//!            submit_query (accepted)
//!   Idle ─────────────────────────────▶ Awaiting
//!    ▲                                     │
//!    └──────────── settlement ─────────────┘
//! ```
//!
//! Only one request is in flight at a time. A submission while `Awaiting`
//! is rejected, never queued, so bot turns always follow the user turn that
//! caused them.
//!
//! The controller is UI-agnostic. A terminal, a web page or a test harness
//! all see the same log and the same updates.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::backend::AnswerBackend;
use crate::config::AssistantConfig;
use crate::lifecycle::RequestLifecycle;
use crate::log::MessageLog;
use crate::messages::{SessionPhase, SessionUpdate, Turn, TurnId};
use crate::models::ModelId;
use crate::validation::{QueryCheck, QueryValidator};

/// Capacity of the update broadcast channel
const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Result of [`SessionController::submit_query`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The query was appended and a backend request started
    Accepted {
        /// Id of the appended user turn
        turn_id: TurnId,
    },
    /// The input was empty after trimming; nothing happened
    IgnoredEmpty,
    /// A request is already in flight; nothing happened
    RejectedBusy,
    /// The input exceeds the configured length; nothing happened
    RejectedTooLong {
        /// Length of the trimmed input in characters
        chars: usize,
        /// Configured maximum
        max: usize,
    },
    /// The input contains disallowed characters; nothing happened
    RejectedInvalid(String),
    /// The session was shut down; nothing happened
    RejectedClosed,
}

impl SubmitOutcome {
    /// Whether a request was started
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Notice a surface may show for a rejected submission
    ///
    /// `None` for accepted and empty submissions.
    #[must_use]
    pub fn notice(&self) -> Option<String> {
        match self {
            Self::Accepted { .. } | Self::IgnoredEmpty => None,
            Self::RejectedBusy => {
                Some("Still waiting for the previous answer; try again shortly.".to_string())
            }
            Self::RejectedTooLong { chars, max } => Some(format!(
                "Query too long: {chars} characters (max: {max})"
            )),
            Self::RejectedInvalid(reason) => Some(reason.clone()),
            Self::RejectedClosed => Some("Session is closed.".to_string()),
        }
    }
}

/// Mutable session state, guarded by one lock
struct SessionState {
    log: MessageLog,
    phase: SessionPhase,
    model: ModelId,
    closed: bool,
    in_flight: Option<JoinHandle<()>>,
}

struct Inner<B: AnswerBackend> {
    lifecycle: RequestLifecycle<B>,
    validator: QueryValidator,
    state: Mutex<SessionState>,
    updates: broadcast::Sender<SessionUpdate>,
    phase_tx: watch::Sender<SessionPhase>,
}

impl<B: AnswerBackend> Inner<B> {
    /// Emit an update; a session without subscribers is fine
    fn emit(&self, update: SessionUpdate) {
        let _ = self.updates.send(update);
    }

    /// Append the bot turn and return to `Idle`, unless torn down
    fn settle(&self, turn: Turn) {
        let mut state = self.state.lock();
        if state.closed {
            tracing::debug!(turn_id = %turn.id(), "Session closed before settlement, dropping turn");
            return;
        }

        tracing::info!(
            turn_id = %turn.id(),
            sources = turn.sources().map_or(0, <[String]>::len),
            "Response settled"
        );

        state.log.append(turn.clone());
        state.phase = SessionPhase::Idle;
        state.in_flight = None;
        self.emit(SessionUpdate::TurnAppended { turn });
        self.emit(SessionUpdate::BusyChanged { busy: false });
        self.phase_tx.send_replace(SessionPhase::Idle);
    }

    /// Abort any in-flight request and mark the session closed
    fn close(&self, state: &mut SessionState) {
        if state.closed {
            return;
        }
        state.closed = true;

        if let Some(handle) = state.in_flight.take() {
            handle.abort();
            tracing::debug!("Aborted in-flight request");
        }
        if state.phase.is_busy() {
            state.phase = SessionPhase::Idle;
            self.emit(SessionUpdate::BusyChanged { busy: false });
        }
        self.emit(SessionUpdate::Closed);
        self.phase_tx.send_replace(SessionPhase::Idle);

        tracing::info!(turns = state.log.len(), "Session closed");
    }
}

impl<B: AnswerBackend> Drop for Inner<B> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.closed {
            return;
        }
        state.closed = true;
        if let Some(handle) = state.in_flight.take() {
            handle.abort();
        }
        let _ = self.updates.send(SessionUpdate::Closed);
    }
}

/// Chat session controller
///
/// Cloning yields another handle to the same session. The in-flight request
/// is cancelled by [`shutdown`](Self::shutdown) or when the last handle is
/// dropped.
pub struct SessionController<B: AnswerBackend + 'static> {
    inner: Arc<Inner<B>>,
}

impl<B: AnswerBackend + 'static> Clone for SessionController<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: AnswerBackend + 'static> SessionController<B> {
    /// Create a session seeded with the configured welcome turn
    pub fn new(backend: B, config: &AssistantConfig) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        let (phase_tx, _) = watch::channel(SessionPhase::Idle);

        let state = SessionState {
            log: MessageLog::seeded(config.welcome_turn()),
            phase: SessionPhase::Idle,
            model: config.default_model,
            closed: false,
            in_flight: None,
        };

        tracing::info!(
            backend = backend.name(),
            model = %config.default_model,
            timeout_secs = config.request_timeout.as_secs(),
            "Session created"
        );

        Self {
            inner: Arc::new(Inner {
                lifecycle: RequestLifecycle::new(Arc::new(backend), config.request_timeout),
                validator: QueryValidator::new(config.max_query_chars),
                state: Mutex::new(state),
                updates,
                phase_tx,
            }),
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Submit user input
    ///
    /// On acceptance the trimmed text is appended as a user turn, the session
    /// enters `Awaiting` and a backend request for the currently selected
    /// model starts in the background. Every other outcome leaves the session
    /// untouched.
    ///
    /// # Panics
    ///
    /// Panics if an accepted query is submitted outside a Tokio runtime.
    pub fn submit_query(&self, text: &str) -> SubmitOutcome {
        let mut state = self.inner.state.lock();

        if state.closed {
            return SubmitOutcome::RejectedClosed;
        }

        let query = match self.inner.validator.check(text) {
            QueryCheck::Valid(query) => query,
            QueryCheck::Empty => {
                tracing::debug!("Ignoring empty input");
                return SubmitOutcome::IgnoredEmpty;
            }
            QueryCheck::TooLong { chars, max } => {
                tracing::warn!(chars, max, "Rejecting over-long query");
                return SubmitOutcome::RejectedTooLong { chars, max };
            }
            check @ QueryCheck::InvalidCharacters => {
                let reason = check.error_message().unwrap_or_default();
                tracing::warn!(reason = %reason, "Rejecting invalid query");
                return SubmitOutcome::RejectedInvalid(reason);
            }
        };

        if state.phase.is_busy() {
            tracing::warn!("Rejecting query while a request is in flight");
            return SubmitOutcome::RejectedBusy;
        }

        let model = state.model;
        let turn = Turn::user(query.clone());
        let turn_id = turn.id().clone();

        state.log.append(turn.clone());
        state.phase = SessionPhase::Awaiting;
        self.inner.emit(SessionUpdate::TurnAppended { turn });
        self.inner.emit(SessionUpdate::BusyChanged { busy: true });
        self.inner.phase_tx.send_replace(SessionPhase::Awaiting);

        tracing::info!(
            turn_id = %turn_id,
            model = %model,
            chars = query.chars().count(),
            "Query accepted"
        );

        let lifecycle = self.inner.lifecycle.clone();
        let weak: Weak<Inner<B>> = Arc::downgrade(&self.inner);
        state.in_flight = Some(tokio::spawn(async move {
            let turn = lifecycle.dispatch(&query, model).await;
            if let Some(inner) = weak.upgrade() {
                inner.settle(turn);
            }
        }));

        SubmitOutcome::Accepted { turn_id }
    }

    /// Select the model for subsequent queries
    ///
    /// Valid in either phase. A request already in flight keeps the model it
    /// was submitted with.
    pub fn set_model(&self, model: ModelId) {
        let mut state = self.inner.state.lock();
        if state.model == model {
            return;
        }
        tracing::debug!(from = %state.model, to = %model, "Model changed");
        state.model = model;
        self.inner.emit(SessionUpdate::ModelChanged { model });
    }

    /// Tear the session down
    ///
    /// Aborts the in-flight request (its turn is never appended), rejects
    /// further submissions and emits [`SessionUpdate::Closed`]. Idempotent.
    pub fn shutdown(&self) {
        let mut state = self.inner.state.lock();
        self.inner.close(&mut state);
    }

    // =========================================================================
    // Read Views
    // =========================================================================

    /// Snapshot of the log in order
    #[must_use]
    pub fn turns(&self) -> Vec<Turn> {
        self.inner.state.lock().log.snapshot()
    }

    /// Run `f` against the log without copying it
    ///
    /// The session lock is held for the duration of `f`.
    ///
    /// # Deadlocks
    ///
    /// The lock is not reentrant. `f` must not call any method of this
    /// controller or of its clones (`is_busy`, `turns`, `submit_query`, ...);
    /// doing so deadlocks the calling thread. Use [`Self::turns`] for a
    /// snapshot that can be inspected freely.
    pub fn with_log<R>(&self, f: impl FnOnce(&MessageLog) -> R) -> R {
        f(&self.inner.state.lock().log)
    }

    /// Number of turns in the log
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.inner.state.lock().log.len()
    }

    /// Most recent turn
    #[must_use]
    pub fn last_turn(&self) -> Option<Turn> {
        self.inner.state.lock().log.last().cloned()
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.inner.state.lock().phase
    }

    /// Whether a request is in flight (drives the typing indicator)
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.phase().is_busy()
    }

    /// Model used for the next accepted query
    #[must_use]
    pub fn selected_model(&self) -> ModelId {
        self.inner.state.lock().model
    }

    /// Whether [`shutdown`](Self::shutdown) has run
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Backend name, for diagnostics
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.inner.lifecycle.backend().name()
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Subscribe to session updates
    ///
    /// Only updates after this call are delivered; pair with
    /// [`turns`](Self::turns) for the current state.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.inner.updates.subscribe()
    }

    /// Wait until no request is in flight
    ///
    /// Returns immediately when idle or closed.
    pub async fn settled(&self) {
        let mut rx = self.inner.phase_tx.subscribe();
        let _ = rx.wait_for(|phase| !phase.is_busy()).await;
    }
}
