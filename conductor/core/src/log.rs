//! Message Log
//!
//! Append-only record of the conversation. The only mutation is
//! [`MessageLog::append`]; there is no edit, removal or clear, so any prefix a
//! surface has already rendered stays valid forever.

use serde::Serialize;

use crate::messages::{Turn, TurnId};

/// Ordered, append-only sequence of turns
#[derive(Clone, Debug, Default, Serialize)]
pub struct MessageLog {
    turns: Vec<Turn>,
}

impl MessageLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log holding a single seed turn
    pub fn seeded(seed: Turn) -> Self {
        Self { turns: vec![seed] }
    }

    /// Append a turn at the end
    pub fn append(&mut self, turn: Turn) {
        tracing::trace!(turn_id = %turn.id(), sender = ?turn.sender(), "Appending turn");
        self.turns.push(turn);
    }

    /// All turns in insertion order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Iterate over turns in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    /// Owned copy of the current log
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the log has no turns
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Most recent turn
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Get turn by ID
    pub fn get(&self, id: &TurnId) -> Option<&Turn> {
        self.turns.iter().find(|t| t.id() == id)
    }
}

impl<'a> IntoIterator for &'a MessageLog {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
