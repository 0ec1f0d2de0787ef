//! Configuration management for Storyloop
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! The resulting [`Config`] is built once at startup and handed to the
//! runner by value; nothing mutates it afterwards.

use crate::api::session::is_cookie_value;
use crate::error::{Result, StoryloopError};
use anyhow::Context;
use crate::prompts::{DEFAULT_TEMPLATE, DEFAULT_TOPICS, TOPIC_PLACEHOLDER};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Storyloop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Session cookies, endpoint base and transport settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Model selection sent with every conversation
    #[serde(default)]
    pub model: ModelConfig,

    /// Per-token prices used by the cost estimator
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Sleep bounds between cycles
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Message template and topic table
    #[serde(default)]
    pub prompts: PromptConfig,
}

/// Session and transport configuration
///
/// The two tokens are copied into the cookie jar of the HTTP client. They have
/// no defaults and must come from the config file or the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Base URL of the chat service (useful for tests and local mocks)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Value of the `auth_session` cookie
    #[serde(default)]
    pub auth_session: String,

    /// Value of the `gcp_token` cookie
    #[serde(default)]
    pub gcp_token: String,

    /// Value of the `i18n_redirected` cookie
    #[serde(default = "default_language")]
    pub language: String,

    /// Blanket client timeout (seconds)
    #[serde(default = "default_session_timeout")]
    pub timeout_seconds: u64,

    /// Browser user agent presented on every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Path of the page presented as `Referer`
    #[serde(default = "default_referer_path")]
    pub referer_path: String,
}

fn default_api_base() -> String {
    "https://mammouth.ai".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_session_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64; rv:136.0) Gecko/20100101 Firefox/136.0".to_string()
}

fn default_referer_path() -> String {
    "/app/a/default".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            auth_session: String::new(),
            gcp_token: String::new(),
            language: default_language(),
            timeout_seconds: default_session_timeout(),
            user_agent: default_user_agent(),
            referer_path: default_referer_path(),
        }
    }
}

/// Model selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model that answers the message
    #[serde(default = "default_model_name")]
    pub name: String,

    /// Default text model registered with a new conversation
    #[serde(default = "default_model_name")]
    pub default_text: String,

    /// Default image model registered with a new conversation
    #[serde(default = "default_image_model")]
    pub default_image: String,

    /// Default web search model registered with a new conversation
    #[serde(default = "default_web_search_model")]
    pub default_web_search: String,
}

fn default_model_name() -> String {
    "anthropic-claude-3-7-sonnet-latest".to_string()
}

fn default_image_model() -> String {
    "replicate-recraftai-recraft-v3".to_string()
}

fn default_web_search_model() -> String {
    "openperplex-v1".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            default_text: default_model_name(),
            default_image: default_image_model(),
            default_web_search: default_web_search_model(),
        }
    }
}

/// Per-token prices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Price of one input (prompt) token
    #[serde(default = "default_input_price")]
    pub input_per_token: f64,

    /// Price of one output (reply) token
    #[serde(default = "default_output_price")]
    pub output_per_token: f64,

    /// Currency symbol used in log lines and reports
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_input_price() -> f64 {
    3e-6
}

fn default_output_price() -> f64 {
    1.5e-5
}

fn default_currency() -> String {
    "€".to_string()
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            input_per_token: default_input_price(),
            output_per_token: default_output_price(),
            currency: default_currency(),
        }
    }
}

/// Sleep bounds between cycles, in milliseconds
///
/// Both ranges are half-open: `[min, max)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Lower bound after a successful cycle
    #[serde(default = "default_success_min_ms")]
    pub success_min_ms: u64,

    /// Upper bound (exclusive) after a successful cycle
    #[serde(default = "default_success_max_ms")]
    pub success_max_ms: u64,

    /// Lower bound after a failed cycle
    #[serde(default = "default_error_min_ms")]
    pub error_min_ms: u64,

    /// Upper bound (exclusive) after a failed cycle
    #[serde(default = "default_error_max_ms")]
    pub error_max_ms: u64,
}

fn default_success_min_ms() -> u64 {
    3 * 60 * 1000
}

fn default_success_max_ms() -> u64 {
    9 * 60 * 1000
}

fn default_error_min_ms() -> u64 {
    30 * 60 * 1000
}

fn default_error_max_ms() -> u64 {
    90 * 60 * 1000
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            success_min_ms: default_success_min_ms(),
            success_max_ms: default_success_max_ms(),
            error_min_ms: default_error_min_ms(),
            error_max_ms: default_error_max_ms(),
        }
    }
}

/// Message template and topic table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Message template; `{topic}` is replaced by the chosen topic
    #[serde(default = "default_template")]
    pub template: String,

    /// Topics to choose from, uniformly
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

fn default_topics() -> Vec<String> {
    DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
            topics: default_topics(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(StoryloopError::Io)
            .with_context(|| format!("Failed to read config file {}", path))?;
        let config = serde_yaml::from_str(&contents)
            .map_err(StoryloopError::Yaml)
            .with_context(|| format!("Failed to parse config file {}", path))?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_base) = std::env::var("STORYLOOP_API_BASE") {
            self.session.api_base = api_base;
        }

        if let Ok(token) = std::env::var("STORYLOOP_AUTH_SESSION") {
            self.session.auth_session = token;
        }

        if let Ok(token) = std::env::var("STORYLOOP_GCP_TOKEN") {
            self.session.gcp_token = token;
        }

        if let Ok(language) = std::env::var("STORYLOOP_LANGUAGE") {
            self.session.language = language;
        }

        if let Ok(timeout) = std::env::var("STORYLOOP_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(value) => self.session.timeout_seconds = value,
                Err(_) => tracing::warn!("Ignoring invalid STORYLOOP_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(model) = std::env::var("STORYLOOP_MODEL") {
            self.model.name = model;
        }

        if let Ok(price) = std::env::var("STORYLOOP_PRICE_INPUT") {
            match price.parse::<f64>() {
                Ok(value) => self.pricing.input_per_token = value,
                Err(_) => tracing::warn!("Ignoring invalid STORYLOOP_PRICE_INPUT: {}", price),
            }
        }

        if let Ok(price) = std::env::var("STORYLOOP_PRICE_OUTPUT") {
            match price.parse::<f64>() {
                Ok(value) => self.pricing.output_per_token = value,
                Err(_) => tracing::warn!("Ignoring invalid STORYLOOP_PRICE_OUTPUT: {}", price),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(model) = &cli.model {
            tracing::debug!("Using model override from CLI: {}", model);
            self.model.name = model.clone();
        }
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        self.validate_offline()?;

        if self.session.auth_session.trim().is_empty() {
            return Err(StoryloopError::Config(
                "session.auth_session must be set (or STORYLOOP_AUTH_SESSION)".to_string(),
            )
            .into());
        }

        if self.session.gcp_token.trim().is_empty() {
            return Err(StoryloopError::Config(
                "session.gcp_token must be set (or STORYLOOP_GCP_TOKEN)".to_string(),
            )
            .into());
        }

        for (field, value) in [
            ("session.auth_session", &self.session.auth_session),
            ("session.gcp_token", &self.session.gcp_token),
            ("session.language", &self.session.language),
        ] {
            if !is_cookie_value(value) {
                return Err(StoryloopError::Config(format!(
                    "{} must not contain whitespace, control characters, '\"', ',', ';' or '\\'",
                    field
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate everything except the session credentials
    ///
    /// Used by commands that never talk to the chat service, such as
    /// `estimate`.
    pub fn validate_offline(&self) -> Result<()> {
        if self.session.api_base.trim().is_empty() {
            return Err(
                StoryloopError::Config("session.api_base cannot be empty".to_string()).into(),
            );
        }

        if self.session.timeout_seconds == 0 {
            return Err(StoryloopError::Config(
                "session.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.model.name.trim().is_empty() {
            return Err(StoryloopError::Config("model.name cannot be empty".to_string()).into());
        }

        if !(self.pricing.input_per_token >= 0.0 && self.pricing.output_per_token >= 0.0) {
            return Err(StoryloopError::Config(
                "pricing.input_per_token and pricing.output_per_token must be non-negative"
                    .to_string(),
            )
            .into());
        }

        if self.backoff.success_min_ms >= self.backoff.success_max_ms {
            return Err(StoryloopError::Config(
                "backoff.success_min_ms must be less than backoff.success_max_ms".to_string(),
            )
            .into());
        }

        if self.backoff.error_min_ms >= self.backoff.error_max_ms {
            return Err(StoryloopError::Config(
                "backoff.error_min_ms must be less than backoff.error_max_ms".to_string(),
            )
            .into());
        }

        if self.prompts.topics.is_empty() {
            return Err(
                StoryloopError::Config("prompts.topics cannot be empty".to_string()).into(),
            );
        }

        if !self.prompts.template.contains(TOPIC_PLACEHOLDER) {
            return Err(StoryloopError::Config(format!(
                "prompts.template must contain {}",
                TOPIC_PLACEHOLDER
            ))
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            model: ModelConfig::default(),
            pricing: PricingConfig::default(),
            backoff: BackoffConfig::default(),
            prompts: PromptConfig::default(),
        }
    }
}
