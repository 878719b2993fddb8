//! Answer Backend Integration
//!
//! This module provides abstracted access to the LCA answer-generation
//! service through a common trait interface.
//!
//! # Available Backends
//!
//! - **HTTP**: the JSON chat endpoint (default `http://localhost:8000/chat`)
//!
//! # Usage
//!
//! ```ignore
//! use lca_conductor_core::backend::{AnswerBackend, ChatRequest, HttpBackend};
//! use lca_conductor_core::{load_config, ModelId};
//!
//! let config = load_config()?;
//! let backend = HttpBackend::new(config.endpoint.clone())?;
//! let response = backend.chat(&ChatRequest::new("What is LCA?", ModelId::Flan)).await?;
//! ```

mod http;
mod traits;

pub use http::{HttpBackend, DEFAULT_ENDPOINT};
pub use traits::{AnswerBackend, BackendError, ChatRequest, ChatResponse};
