//! Storyloop - looping chat bot client library
//!
//! This library provides the pieces of a bot that repeatedly opens a
//! conversation on a chat web service, sends one generated message, prices
//! the exchange with a tokenizer, deletes the conversation and sleeps.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: Cookie session, endpoint URLs and the conversation lifecycle calls
//! - `cost`: Token counting and cost accumulation
//! - `prompts`: Story message template and topic list
//! - `backoff`: Randomized sleep ranges after success and error
//! - `runner`: The cycle and the cancellable loop around it
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Command handlers invoked by the binary
//!
//! # Example
//!
//! ```no_run
//! use storyloop::{Config, Runner, WebChatClient};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/storyloop.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let api = WebChatClient::new(&config)?;
//!     let mut runner = Runner::with_seed(api, config, None)?;
//!     runner.run(CancellationToken::new(), Some(1)).await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod backoff;
pub mod cli;
pub mod commands;
pub mod config;
pub mod cost;
pub mod error;
pub mod prompts;
pub mod runner;

// Re-export commonly used types
pub use api::{ChatApi, WebChatClient};
pub use config::Config;
pub use cost::{CostEstimator, SessionCost, TokenCost, TokenDirection};
pub use error::{Result, StoryloopError};
pub use runner::{CycleOutcome, RunSummary, Runner};

#[cfg(test)]
pub mod test_utils;
