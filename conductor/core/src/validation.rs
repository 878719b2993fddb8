//! Query Validation
//!
//! Checks user input at the boundary where it enters the session, before
//! anything is appended to the log or sent to the backend.
//!
//! All validation is fail-safe: when in doubt, reject the input.

use serde::{Deserialize, Serialize};

/// Default maximum query length in characters
pub const DEFAULT_MAX_QUERY_CHARS: usize = 32 * 1024;

/// Result of validating a query
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryCheck {
    /// Input is valid; carries the trimmed text to submit
    Valid(String),
    /// Input was empty or whitespace only
    Empty,
    /// Input exceeds the configured length
    TooLong {
        /// Length of the trimmed input in characters
        chars: usize,
        /// Configured maximum
        max: usize,
    },
    /// Input contains control characters other than newline, tab or CR
    InvalidCharacters,
}

impl QueryCheck {
    /// Check if the result indicates valid input
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Get the error message if invalid
    ///
    /// Empty input has no message: it is ignored, not reported.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Valid(_) | Self::Empty => None,
            Self::TooLong { chars, max } => {
                Some(format!("Query too long: {chars} characters (max: {max})"))
            }
            Self::InvalidCharacters => {
                Some("Query contains invalid control characters".to_string())
            }
        }
    }
}

/// Validator for user queries
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryValidator {
    max_query_chars: usize,
}

impl Default for QueryValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUERY_CHARS)
    }
}

impl QueryValidator {
    /// Create a validator with the given length limit
    pub fn new(max_query_chars: usize) -> Self {
        Self { max_query_chars }
    }

    /// Configured length limit
    pub fn max_query_chars(&self) -> usize {
        self.max_query_chars
    }

    /// Trim and validate a raw query
    pub fn check(&self, raw: &str) -> QueryCheck {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return QueryCheck::Empty;
        }

        let chars = trimmed.chars().count();
        if chars > self.max_query_chars {
            return QueryCheck::TooLong {
                chars,
                max: self.max_query_chars,
            };
        }

        if trimmed
            .chars()
            .any(|c| c.is_control() && c != '\n' && c != '\t' && c != '\r')
        {
            return QueryCheck::InvalidCharacters;
        }

        QueryCheck::Valid(trimmed.to_string())
    }
}
