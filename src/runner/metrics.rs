//! Metrics for bot cycles
//!
//! Recorded through the `metrics` facade. Nothing is exported unless a
//! recorder is installed by the host process, in which case the following
//! series are emitted:
//!
//! - `storyloop_cycles_started_total`: Counter of cycles started
//! - `storyloop_cycles_total`: Counter of finished cycles by outcome
//! - `storyloop_cycle_duration_seconds`: Histogram of cycle duration by outcome
//! - `storyloop_tokens_total`: Counter of estimated tokens by direction
//! - `storyloop_cost_micros_total`: Counter of estimated cost (millionths) by direction
//! - `storyloop_backoff_seconds`: Histogram of sleep durations by kind
//!
//! # Examples
//!
//! ```
//! use storyloop::runner::metrics::CycleMetrics;
//!
//! let metrics = CycleMetrics::new();
//! metrics.record_outcome("completed");
//! ```

use crate::backoff::BackoffKind;
use crate::cost::TokenCost;
use metrics::{counter, histogram, increment_counter};
use std::cell::Cell;
use std::time::{Duration, Instant};

/// Outcome label used when a cycle is dropped before it finishes
const ABORTED: &str = "aborted";

/// Metrics collection for a single cycle
///
/// Uses interior mutability (Cell) so the outcome can be recorded through
/// an immutable reference. Recording happens at most once; a cycle dropped
/// without an outcome is counted as aborted.
#[derive(Debug)]
pub struct CycleMetrics {
    start: Instant,
    recorded: Cell<bool>,
}

impl CycleMetrics {
    /// Start timing a cycle
    pub fn new() -> Self {
        increment_counter!("storyloop_cycles_started_total");
        Self {
            start: Instant::now(),
            recorded: Cell::new(false),
        }
    }

    /// Record how the cycle ended
    pub fn record_outcome(&self, outcome: &str) {
        if self.recorded.get() {
            return;
        }
        self.recorded.set(true);

        histogram!(
            "storyloop_cycle_duration_seconds",
            self.start.elapsed().as_secs_f64(),
            "outcome" => outcome.to_string()
        );
        increment_counter!("storyloop_cycles_total", "outcome" => outcome.to_string());
    }
}

impl Default for CycleMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CycleMetrics {
    fn drop(&mut self) {
        if !self.recorded.get() {
            increment_counter!("storyloop_cycles_total", "outcome" => ABORTED);
        }
    }
}

/// Record an estimated token count and its cost
pub fn record_tokens(estimate: &TokenCost) {
    let direction = estimate.direction.as_str();
    counter!("storyloop_tokens_total", estimate.tokens as u64, "direction" => direction);
    counter!(
        "storyloop_cost_micros_total",
        (estimate.cost * 1_000_000.0).round() as u64,
        "direction" => direction
    );
}

/// Record a sleep between cycles
pub fn record_backoff(kind: BackoffKind, delay: Duration) {
    histogram!("storyloop_backoff_seconds", delay.as_secs_f64(), "kind" => kind.as_str());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::TokenDirection;

    #[test]
    fn test_record_outcome_sets_flag() {
        let metrics = CycleMetrics::new();
        metrics.record_outcome("completed");
        assert!(metrics.recorded.get());
    }

    #[test]
    fn test_double_record_is_ignored() {
        let metrics = CycleMetrics::new();
        metrics.record_outcome("create_failed");
        metrics.record_outcome("completed");
        assert!(metrics.recorded.get());
    }

    #[test]
    fn test_drop_without_recording() {
        let _metrics = CycleMetrics::new();
    }


    #[test]
    fn test_record_tokens_and_backoff_without_recorder() {
        record_tokens(&TokenCost {
            direction: TokenDirection::Output,
            tokens: 12,
            cost: 0.00018,
        });
        record_backoff(BackoffKind::Error, Duration::from_secs(1800));
    }
}
