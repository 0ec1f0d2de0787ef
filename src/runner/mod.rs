//! Runner module for Storyloop
//!
//! This module contains the bot control loop and the metrics it records.

pub mod core;
pub mod metrics;

pub use self::core::{format_duration, CycleOutcome, CycleReport, RunSummary, Runner};
