//! Command-line interface definition for Storyloop
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the bot loop, a single cycle, and local
//! cost estimation.

use clap::{Parser, Subcommand};

/// Storyloop - looping chat bot client
///
/// Opens a conversation, sends one generated message, estimates its cost,
/// deletes the conversation, sleeps, and repeats.
#[derive(Parser, Debug, Clone)]
#[command(name = "storyloop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/storyloop.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Override the configured model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Command to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for Storyloop
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the bot loop until interrupted
    Run {
        /// Stop after this many cycles
        #[arg(long)]
        max_cycles: Option<u64>,

        /// Seed for topic choice and backoff (reproducible runs)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run exactly one cycle without sleeping
    Once {
        /// Seed for topic choice
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Estimate the token cost of a message and reply locally
    Estimate {
        /// Outgoing message text
        #[arg(short, long)]
        input: String,

        /// Reply text
        #[arg(short, long, default_value = "")]
        output: String,

        /// Print the estimate as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The command to execute, falling back to an unbounded `run`
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run {
            max_cycles: None,
            seed: None,
        })
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/storyloop.yaml".to_string()),
            verbose: false,
            json_logs: false,
            model: None,
            command: None,
        }
    }
}
