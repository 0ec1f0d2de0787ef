//! Randomized delay between cycles
//!
//! A successful cycle is followed by a short pause, a failed one by a long
//! pause. Both are drawn uniformly from half-open millisecond ranges.

use crate::config::BackoffConfig;
use rand::Rng;
use std::fmt;
use std::ops::Range;
use std::time::Duration;

/// Which range to draw the next delay from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffKind {
    /// After a completed cycle
    Success,
    /// After a create or send failure
    Error,
}

impl BackoffKind {
    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            BackoffKind::Success => "success",
            BackoffKind::Error => "error",
        }
    }
}

impl fmt::Display for BackoffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delay ranges for both outcomes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    success_ms: Range<u64>,
    error_ms: Range<u64>,
}

impl Backoff {
    /// Build from validated configuration
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use std::time::Duration;
    /// use storyloop::backoff::{Backoff, BackoffKind};
    /// use storyloop::config::BackoffConfig;
    ///
    /// let backoff = Backoff::from_config(&BackoffConfig::default());
    /// let mut rng = StdRng::seed_from_u64(0);
    /// let delay = backoff.delay(BackoffKind::Success, &mut rng);
    /// assert!(delay >= Duration::from_secs(180) && delay < Duration::from_secs(540));
    /// ```
    pub fn from_config(config: &BackoffConfig) -> Self {
        Self {
            success_ms: config.success_min_ms..config.success_max_ms,
            error_ms: config.error_min_ms..config.error_max_ms,
        }
    }

    /// Millisecond range for `kind`
    pub fn range(&self, kind: BackoffKind) -> Range<u64> {
        match kind {
            BackoffKind::Success => self.success_ms.clone(),
            BackoffKind::Error => self.error_ms.clone(),
        }
    }

    /// Draw the next delay for `kind`
    ///
    /// An empty range (min == max) yields exactly `min`; validation normally
    /// rules that out.
    pub fn delay<R: Rng>(&self, kind: BackoffKind, rng: &mut R) -> Duration {
        let range = self.range(kind);
        let millis = if range.is_empty() {
            range.start
        } else {
            rng.random_range(range)
        };
        Duration::from_millis(millis)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::from_config(&BackoffConfig::default())
    }
}
