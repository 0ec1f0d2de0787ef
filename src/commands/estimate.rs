//! Local cost estimation command
//!
//! Runs the tokenizer and pricing over a message and an optional reply and
//! prints the result as a table or JSON. No network access is needed, so the
//! session credentials are not checked.

use crate::config::Config;
use crate::cost::{CostEstimator, TokenCost, TokenDirection};
use crate::error::{Result, StoryloopError};
use prettytable::{cell, row, Table};
use serde::Serialize;

/// Estimated cost of one exchange
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateReport {
    /// Model the prices apply to
    pub model: String,
    /// Currency symbol
    pub currency: String,
    /// Cost of the message
    pub input: TokenCost,
    /// Cost of the reply
    pub output: TokenCost,
    /// Input plus output cost
    pub total: f64,
}

/// Estimate and print the cost of `input` and `output`
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `input` - Message text
/// * `output` - Reply text, possibly empty
/// * `json` - Print JSON instead of a table
///
/// # Errors
///
/// Returns error if the configuration is invalid, the tokenizer cannot be
/// loaded, or JSON serialization fails.
///
/// # Examples
///
/// ```no_run
/// use storyloop::commands::estimate::estimate;
/// use storyloop::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// estimate(&Config::default(), "Tell me a story", "", true)?;
/// # Ok(())
/// # }
/// ```
pub fn estimate(config: &Config, input: &str, output: &str, json: bool) -> Result<()> {
    let report = build_report(config, input, output)?;
    if json {
        let json = serde_json::to_string_pretty(&report).map_err(StoryloopError::Serialization)?;
        println!("{}", json);
    } else {
        println!();
        report_table(&report).printstd();
        println!();
    }
    Ok(())
}

/// Compute the estimate without printing it
///
/// # Errors
///
/// Returns error if the configuration is invalid or the tokenizer cannot be
/// loaded.
pub fn build_report(config: &Config, input: &str, output: &str) -> Result<EstimateReport> {
    config.validate_offline()?;
    let estimator = CostEstimator::new(config.pricing.clone())?;

    let input = estimator.estimate(input, TokenDirection::Input);
    let output = estimator.estimate(output, TokenDirection::Output);
    tracing::debug!(
        "Estimated {} input and {} output tokens",
        input.tokens,
        output.tokens
    );

    Ok(EstimateReport {
        model: config.model.name.clone(),
        currency: config.pricing.currency.clone(),
        total: input.cost + output.cost,
        input,
        output,
    })
}

fn report_table(report: &EstimateReport) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Direction", "Tokens", "Cost"]);
    for estimate in [&report.input, &report.output] {
        table.add_row(row![
            estimate.direction,
            estimate.tokens,
            format!("{:.6}{}", estimate.cost, report.currency)
        ]);
    }
    table.add_row(row![
        "total",
        report.input.tokens + report.output.tokens,
        format!("{:.6}{}", report.total, report.currency)
    ]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_error_contains;

    #[test]
    fn test_build_report_uses_separate_rates() {
        let config = Config::default();
        let report = build_report(&config, "Tell me a story", "Once upon a time").unwrap();

        assert_eq!(report.input.direction, TokenDirection::Input);
        assert_eq!(report.output.direction, TokenDirection::Output);
        assert_eq!(
            report.input.cost,
            report.input.tokens as f64 * config.pricing.input_per_token
        );
        assert_eq!(
            report.output.cost,
            report.output.tokens as f64 * config.pricing.output_per_token
        );
        assert_eq!(report.total, report.input.cost + report.output.cost);
    }

    #[test]
    fn test_build_report_empty_output_is_free() {
        let report = build_report(&Config::default(), "Hello", "").unwrap();
        assert_eq!(report.output.tokens, 0);
        assert_eq!(report.output.cost, 0.0);
    }

    #[test]
    fn test_build_report_does_not_need_credentials() {
        let config = Config::default();
        assert!(config.session.auth_session.is_empty());
        assert!(build_report(&config, "Hello", "").is_ok());
    }

    #[test]
    fn test_build_report_rejects_invalid_pricing() {
        let mut config = Config::default();
        config.pricing.output_per_token = -1.0;
        assert_error_contains(build_report(&config, "Hello", ""), "non-negative");
    }

    #[test]
    fn test_report_serializes_lowercase_direction() {
        let report = build_report(&Config::default(), "Hello", "World").unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["input"]["direction"], "input");
        assert_eq!(json["output"]["direction"], "output");
        assert!(json["total"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_report_table_has_total_row() {
        let report = build_report(&Config::default(), "Hello", "World").unwrap();
        let table = report_table(&report);
        assert_eq!(table.len(), 4);
        assert!(table.to_string().contains("total"));
    }
}
