//! Conversation Messages
//!
//! Turns recorded in the session log and the updates the controller sends to
//! UI surfaces.
//!
//! # Design Philosophy
//!
//! The session controller is the only thing that decides what goes into the
//! conversation. Surfaces are renderers: they read the log and listen for
//! [`SessionUpdate`]s, they never edit turns. A [`Turn`] therefore has private
//! fields and no mutators once it has been built.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::ModelId;

/// Turn identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnId(pub String);

impl TurnId {
    /// Generate a new unique turn ID
    ///
    /// Uses an atomic counter combined with a timestamp so two turns created
    /// in the same millisecond still get distinct IDs.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let count = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("turn_{}_{count}", now_ms()))
    }
}

impl Default for TurnId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TurnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who produced a turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed by the user
    User,
    /// Produced by the assistant (answer, fallback or error)
    Bot,
}

/// One message in the conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    id: TurnId,
    content: String,
    sender: Sender,
    /// Unix timestamp in milliseconds
    timestamp: u64,
    /// Citation labels; only bot turns carry them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sources: Option<Vec<String>>,
}

impl Turn {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: TurnId::new(),
            content: content.into(),
            sender: Sender::User,
            timestamp: now_ms(),
            sources: None,
        }
    }

    /// Create a bot turn with its (possibly empty) citation list
    pub fn bot(content: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            id: TurnId::new(),
            content: content.into(),
            sender: Sender::Bot,
            timestamp: now_ms(),
            sources: Some(sources),
        }
    }

    /// Unique ID of this turn
    pub fn id(&self) -> &TurnId {
        &self.id
    }

    /// Message text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Who sent this turn
    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Creation time (Unix timestamp ms)
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Citation labels, `None` for user turns
    pub fn sources(&self) -> Option<&[String]> {
        self.sources.as_deref()
    }

    /// Whether this turn came from the user
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// Creation time formatted as local `HH:MM`
    #[must_use]
    pub fn display_time(&self) -> String {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(|ms| Local.timestamp_millis_opt(ms).single())
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_default()
    }
}

/// Controller phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No request outstanding, ready for input
    Idle,
    /// Exactly one backend request outstanding
    Awaiting,
}

impl SessionPhase {
    /// Whether a request is in flight
    #[must_use]
    pub fn is_busy(self) -> bool {
        self == Self::Awaiting
    }

    /// Human-readable description
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Awaiting => "Retrieving from LCA database...",
        }
    }
}

/// Updates from the controller to UI surfaces
///
/// Sent in the same order the session state changed, so a surface that
/// applies them in order mirrors the log exactly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SessionUpdate {
    /// A turn was appended to the log
    TurnAppended {
        /// The new turn
        turn: Turn,
    },

    /// The busy flag changed
    BusyChanged {
        /// Whether a request is now outstanding
        busy: bool,
    },

    /// The user picked another model
    ModelChanged {
        /// Model used for subsequent queries
        model: ModelId,
    },

    /// The session was torn down
    Closed,
}

/// Get current timestamp in milliseconds
pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
