//! Conductor Core - Headless Chat Session Controller for the LCA Assistant
//!
//! This crate drives a turn-based conversation with the LCA knowledge
//! backend, completely independent of any UI. It can back a terminal, a web
//! page or run headless under test.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         UI Surfaces                           │
//! │        ┌──────────┐    ┌──────────┐    ┌──────────────┐       │
//! │        │ lca-chat │    │  Web UI  │    │ Test harness │       │
//! │        └────┬─────┘    └────┬─────┘    └──────┬───────┘       │
//! │             └───────────────┼─────────────────┘               │
//! │          submit_query / set_model (down)                      │
//! │          SessionUpdate / read views (up)                      │
//! └─────────────────────────────┼─────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────┼─────────────────────────────────┐
//! │                     CONDUCTOR CORE                            │
//! │  ┌──────────────────────────┴─────────────────────────────┐   │
//! │  │                  SessionController                      │   │
//! │  │  ┌────────────┐  ┌────────────┐  ┌──────────────────┐  │   │
//! │  │  │ MessageLog │  │ Validator  │  │ RequestLifecycle │  │   │
//! │  │  └────────────┘  └────────────┘  └────────┬─────────┘  │   │
//! │  └───────────────────────────────────────────┼────────────┘   │
//! │                                   AnswerBackend (HTTP)        │
//! └──────────────────────────────────────────────┼────────────────┘
//!                                                ▼
//!                                  POST /chat {query, model}
//! ```
//!
//! # Key Types
//!
//! - [`SessionController`]: owns the log and the single in-flight request
//! - [`Turn`]: one immutable message in the log
//! - [`SessionUpdate`]: change notifications for surfaces
//! - [`ModelId`]: the closed set of backend models
//! - [`AssistantConfig`]: resolved configuration
//!
//! # Quick Start
//!
//! ```ignore
//! use lca_conductor_core::{load_config, HttpBackend, SessionController};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let backend = HttpBackend::new(config.endpoint.clone())?;
//!     let session = SessionController::new(backend, &config);
//!
//!     session.submit_query("What is LCA?");
//!     session.settled().await;
//!
//!     for turn in session.turns() {
//!         println!("{:?}: {}", turn.sender(), turn.content());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`backend`]: answer backend abstraction and the HTTP client
//! - [`config`]: TOML, environment and CLI configuration
//! - [`conductor`]: the session controller
//! - [`lifecycle`]: one backend round trip, outcome to turn
//! - [`log`]: append-only message log
//! - [`messages`]: turns, phases and updates
//! - [`models`]: model catalog
//! - [`validation`]: query checks at the input boundary

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod conductor;
pub mod config;
pub mod lifecycle;
pub mod log;
pub mod messages;
pub mod models;
pub mod validation;

// Re-exports for convenience
pub use backend::{AnswerBackend, BackendError, ChatRequest, ChatResponse, HttpBackend};
pub use conductor::{SessionController, SubmitOutcome};
pub use lifecycle::{settle_turn, RequestLifecycle, ERROR_PREFIX, FALLBACK_ANSWER};
pub use log::MessageLog;
pub use messages::{Sender, SessionPhase, SessionUpdate, Turn, TurnId};
pub use models::{ModelId, UnknownModel};
pub use validation::{QueryCheck, QueryValidator};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, load_config_with_env,
    AssistantConfig, AssistantToml, ConfigError, ConfigOverrides, ConfigSource,
};
