//! Token-based cost estimation
//!
//! The estimator runs the `o200k_base` tokenizer over a piece of text and
//! multiplies the token count by the configured per-token price. Input text
//! is priced at the input rate and reply text at the output rate.
//!
//! [`SessionCost`] accumulates the results for the lifetime of the process.

use crate::config::PricingConfig;
use crate::error::{Result, StoryloopError};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tiktoken_rs::CoreBPE;

/// Which side of the exchange a piece of text belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenDirection {
    /// Text sent to the model
    Input,
    /// Text returned by the model
    Output,
}

impl TokenDirection {
    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenDirection::Input => "input",
            TokenDirection::Output => "output",
        }
    }
}

impl fmt::Display for TokenDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token count and cost of a single piece of text
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TokenCost {
    /// Side of the exchange
    pub direction: TokenDirection,
    /// Number of tokens produced by the tokenizer
    pub tokens: usize,
    /// `tokens × rate` for the direction
    pub cost: f64,
}

/// Stateless cost estimator
///
/// Cloning is cheap; the tokenizer is shared.
#[derive(Clone)]
pub struct CostEstimator {
    bpe: Arc<CoreBPE>,
    pricing: PricingConfig,
}

impl fmt::Debug for CostEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CostEstimator")
            .field("encoding", &"o200k_base")
            .field("pricing", &self.pricing)
            .finish()
    }
}

impl CostEstimator {
    /// Load the `o200k_base` codec and bind it to `pricing`
    ///
    /// # Errors
    ///
    /// Returns `StoryloopError::Tokenizer` if the codec cannot be built.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyloop::config::PricingConfig;
    /// use storyloop::cost::{CostEstimator, TokenDirection};
    ///
    /// let estimator = CostEstimator::new(PricingConfig::default()).unwrap();
    /// let estimate = estimator.estimate("Once upon a time", TokenDirection::Input);
    /// assert!(estimate.tokens > 0);
    /// ```
    pub fn new(pricing: PricingConfig) -> Result<Self> {
        let bpe = tiktoken_rs::o200k_base()
            .map_err(|e| StoryloopError::Tokenizer(format!("failed to load o200k_base: {}", e)))?;
        Ok(Self {
            bpe: Arc::new(bpe),
            pricing,
        })
    }

    /// Prices this estimator applies
    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    /// Number of tokens in `text`
    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Per-token price for `direction`
    pub fn rate(&self, direction: TokenDirection) -> f64 {
        match direction {
            TokenDirection::Input => self.pricing.input_per_token,
            TokenDirection::Output => self.pricing.output_per_token,
        }
    }

    /// Token count and cost of `text`
    pub fn estimate(&self, text: &str, direction: TokenDirection) -> TokenCost {
        let tokens = self.count_tokens(text);
        TokenCost {
            direction,
            tokens,
            cost: tokens as f64 * self.rate(direction),
        }
    }
}

/// Running totals for the lifetime of the process
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SessionCost {
    /// Accumulated input cost
    pub input_cost: f64,
    /// Accumulated output cost
    pub output_cost: f64,
    /// Accumulated input tokens
    pub input_tokens: usize,
    /// Accumulated output tokens
    pub output_tokens: usize,
}

impl SessionCost {
    /// Add one estimate to the matching total
    pub fn record(&mut self, estimate: &TokenCost) {
        match estimate.direction {
            TokenDirection::Input => {
                self.input_cost += estimate.cost;
                self.input_tokens += estimate.tokens;
            }
            TokenDirection::Output => {
                self.output_cost += estimate.cost;
                self.output_tokens += estimate.tokens;
            }
        }
    }

    /// Input plus output cost
    pub fn total(&self) -> f64 {
        self.input_cost + self.output_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> CostEstimator {
        CostEstimator::new(PricingConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_text_has_no_tokens() {
        let estimate = estimator().estimate("", TokenDirection::Output);
        assert_eq!(estimate.tokens, 0);
        assert_eq!(estimate.cost, 0.0);
    }

    #[test]
    fn test_input_cost_uses_input_rate() {
        let estimator = estimator();
        let text = "Hello, I'd like you to tell me a long story about a cat.";
        let estimate = estimator.estimate(text, TokenDirection::Input);
        assert!(estimate.tokens > 0);
        assert_eq!(estimate.cost, estimate.tokens as f64 * 3e-6);
    }

    #[test]
    fn test_output_cost_uses_output_rate() {
        let estimator = estimator();
        let text = "Once upon a time there was a cat who lived on a boat.";
        let estimate = estimator.estimate(text, TokenDirection::Output);
        assert!(estimate.tokens > 0);
        assert_eq!(estimate.cost, estimate.tokens as f64 * 1.5e-5);
    }

    #[test]
    fn test_same_text_costs_more_as_output() {
        let estimator = estimator();
        let text = "The same words, priced twice.";
        let input = estimator.estimate(text, TokenDirection::Input);
        let output = estimator.estimate(text, TokenDirection::Output);
        assert_eq!(input.tokens, output.tokens);
        assert!(output.cost > input.cost);
    }

    #[test]
    fn test_longer_text_has_more_tokens() {
        let estimator = estimator();
        let short = estimator.count_tokens("a cat");
        let long = estimator.count_tokens(&"a cat sat on a mat. ".repeat(20));
        assert!(long > short);
    }

    #[test]
    fn test_custom_pricing() {
        let estimator = CostEstimator::new(PricingConfig {
            input_per_token: 1.0,
            output_per_token: 2.0,
            currency: "$".to_string(),
        })
        .unwrap();
        let estimate = estimator.estimate("abc def", TokenDirection::Output);
        assert_eq!(estimate.cost, 2.0 * estimate.tokens as f64);
    }

    #[test]
    fn test_session_cost_accumulates_by_direction() {
        let mut session = SessionCost::default();
        session.record(&TokenCost {
            direction: TokenDirection::Input,
            tokens: 10,
            cost: 0.5,
        });
        session.record(&TokenCost {
            direction: TokenDirection::Output,
            tokens: 20,
            cost: 1.25,
        });
        session.record(&TokenCost {
            direction: TokenDirection::Input,
            tokens: 2,
            cost: 0.25,
        });

        assert_eq!(session.input_tokens, 12);
        assert_eq!(session.output_tokens, 20);
        assert_eq!(session.input_cost, 0.75);
        assert_eq!(session.output_cost, 1.25);
        assert_eq!(session.total(), 2.0);
    }

    #[test]
    fn test_direction_serializes_lowercase() {
        let json = serde_json::to_string(&TokenDirection::Output).unwrap();
        assert_eq!(json, "\"output\"");
    }
}
