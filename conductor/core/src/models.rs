//! Model Catalog
//!
//! The closed set of answer-generation models the backend can serve. The
//! identifier is what goes over the wire; the label is what a surface shows
//! in its model picker.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backend model selector
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelId {
    /// Google Flan T5 (retrieval + text2text generation)
    #[default]
    Flan,
    /// Llama 3 instruct (retrieval + chat template generation)
    Llama,
}

impl ModelId {
    /// Every model, in picker order
    pub const ALL: [ModelId; 2] = [ModelId::Flan, ModelId::Llama];

    /// Wire identifier sent in the `model` field
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flan => "flan",
            Self::Llama => "llama",
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Flan => "Google Flan T5",
            Self::Llama => "Llama 3",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a string names no known model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown model '{0}' (expected one of: flan, llama)")]
pub struct UnknownModel(pub String);

impl FromStr for ModelId {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flan" => Ok(Self::Flan),
            "llama" => Ok(Self::Llama),
            _ => Err(UnknownModel(s.to_string())),
        }
    }
}
