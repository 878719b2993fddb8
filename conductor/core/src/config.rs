//! TOML Configuration File Support
//!
//! Centralized configuration loading for the assistant, supporting a TOML
//! file at `~/.config/lca-assistant/assistant.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! endpoint = "http://localhost:8000/chat"
//! default_model = "flan"
//! request_timeout_secs = 120
//!
//! [session]
//! max_query_chars = 32768
//! welcome_message = "Hello!"
//! welcome_sources = ["LCA Knowledge Base - Introduction"]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::DEFAULT_ENDPOINT;
use crate::lifecycle::DEFAULT_REQUEST_TIMEOUT;
use crate::messages::Turn;
use crate::models::ModelId;
use crate::validation::DEFAULT_MAX_QUERY_CHARS;

/// Greeting shown as the first turn of every session
pub const WELCOME_MESSAGE: &str = "Hello! I'm your LCA assistant for the Ministry of Mines. \
I can help you with Life Cycle Assessment queries, mining environmental impacts, and circular \
economy insights. What would you like to know?";

/// Sources attached to the greeting
pub const WELCOME_SOURCES: [&str; 2] = [
    "LCA Knowledge Base - Introduction",
    "Mining Standards Database",
];

/// Environment variable for the chat endpoint URL
pub const ENV_BACKEND_URL: &str = "LCA_BACKEND_URL";
/// Environment variable for the default model id
pub const ENV_MODEL: &str = "LCA_MODEL";
/// Environment variable for the request timeout in seconds
pub const ENV_REQUEST_TIMEOUT: &str = "LCA_REQUEST_TIMEOUT";
/// Environment variable for the maximum query length
pub const ENV_MAX_QUERY_CHARS: &str = "LCA_MAX_QUERY_CHARS";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the highest-priority configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Backend section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendToml {
    /// Chat endpoint URL
    pub endpoint: Option<String>,

    /// Model id selected at session start
    pub default_model: Option<String>,

    /// Bound on one backend round trip, in seconds
    pub request_timeout_secs: Option<u64>,
}

/// Session section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionToml {
    /// Maximum query length in characters
    pub max_query_chars: Option<usize>,

    /// Greeting text of the seed turn
    pub welcome_message: Option<String>,

    /// Sources attached to the seed turn
    pub welcome_sources: Option<Vec<String>>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantToml {
    /// Backend configuration section
    pub backend: BackendToml,

    /// Session configuration section
    pub session: SessionToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration for a chat session
#[derive(Clone, Debug)]
pub struct AssistantConfig {
    /// Chat endpoint URL
    pub endpoint: String,

    /// Model selected when the session starts
    pub default_model: ModelId,

    /// Bound on one backend round trip
    pub request_timeout: Duration,

    /// Maximum query length in characters
    pub max_query_chars: usize,

    /// Greeting text of the seed turn
    pub welcome_message: String,

    /// Sources attached to the seed turn
    pub welcome_sources: Vec<String>,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    source: ConfigSource,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            default_model: ModelId::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_query_chars: DEFAULT_MAX_QUERY_CHARS,
            welcome_message: WELCOME_MESSAGE.to_string(),
            welcome_sources: WELCOME_SOURCES.iter().map(|s| (*s).to_string()).collect(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl AssistantConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the highest-priority source that contributed a value
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// The bot turn every session log starts with
    #[must_use]
    pub fn welcome_turn(&self) -> Turn {
        Turn::bot(self.welcome_message.clone(), self.welcome_sources.clone())
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        if self.max_query_chars == 0 {
            return Err(ConfigError::Validation(
                "max_query_chars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/lca-assistant/assistant.toml` or
/// `~/.config/lca-assistant/assistant.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lca-assistant").join("assistant.toml"))
}

/// Load configuration from the default path and the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed,
/// or if any resolved value is invalid. A missing file is not an error.
pub fn load_config() -> Result<AssistantConfig, ConfigError> {
    load_config_from_path(default_config_path().as_deref())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// Same as [`load_config`].
pub fn load_config_from_path(path: Option<&Path>) -> Result<AssistantConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration, resolving environment variables through `env`
///
/// # Errors
///
/// Same as [`load_config`].
pub fn load_config_with_env<F>(path: Option<&Path>, env: F) -> Result<AssistantConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = AssistantConfig::default();

    if let Some(config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::Read {
                    path: config_path.to_path_buf(),
                    source: e,
                })?;

            let toml_config: AssistantToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.to_path_buf());
            config.source = ConfigSource::File;

            tracing::info!(path = %config_path.display(), "Loaded configuration from file");
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env)?;
    config.validate()?;

    Ok(config)
}

fn parse_model(value: &str) -> Result<ModelId, ConfigError> {
    value
        .parse()
        .map_err(|e: crate::models::UnknownModel| ConfigError::Validation(e.to_string()))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Validation(format!("{key} must be a number, got '{value}'")))
}

fn apply_toml_config(config: &mut AssistantConfig, toml: &AssistantToml) -> Result<(), ConfigError> {
    if let Some(ref endpoint) = toml.backend.endpoint {
        config.endpoint.clone_from(endpoint);
    }
    if let Some(ref model) = toml.backend.default_model {
        config.default_model = parse_model(model)?;
    }
    if let Some(secs) = toml.backend.request_timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }

    if let Some(max) = toml.session.max_query_chars {
        config.max_query_chars = max;
    }
    if let Some(ref message) = toml.session.welcome_message {
        config.welcome_message.clone_from(message);
    }
    if let Some(ref sources) = toml.session.welcome_sources {
        config.welcome_sources.clone_from(sources);
    }
    Ok(())
}

fn apply_env_config<F>(config: &mut AssistantConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(ENV_BACKEND_URL) {
        config.endpoint = url;
        config.source = ConfigSource::Env;
    }
    if let Some(model) = env(ENV_MODEL) {
        config.default_model = parse_model(&model)?;
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = env(ENV_REQUEST_TIMEOUT) {
        config.request_timeout = Duration::from_secs(parse_number(ENV_REQUEST_TIMEOUT, &timeout)?);
        config.source = ConfigSource::Env;
    }
    if let Some(max) = env(ENV_MAX_QUERY_CHARS) {
        config.max_query_chars = parse_number(ENV_MAX_QUERY_CHARS, &max)?;
        config.source = ConfigSource::Env;
    }
    Ok(())
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Endpoint override
    pub endpoint: Option<String>,

    /// Default model override
    pub default_model: Option<ModelId>,

    /// Request timeout override (seconds)
    pub request_timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set endpoint override
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set default model override
    #[must_use]
    pub fn with_default_model(mut self, model: ModelId) -> Self {
        self.default_model = Some(model);
        self
    }

    /// Set request timeout override
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Whether any override is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoint.is_none()
            && self.default_model.is_none()
            && self.request_timeout_secs.is_none()
    }

    /// Apply overrides to a configuration and re-validate it
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if an override is out of range.
    pub fn apply(&self, config: &mut AssistantConfig) -> Result<(), ConfigError> {
        if self.is_empty() {
            return Ok(());
        }
        config.source = ConfigSource::Cli;

        if let Some(ref endpoint) = self.endpoint {
            config.endpoint.clone_from(endpoint);
        }
        if let Some(model) = self.default_model {
            config.default_model = model;
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
