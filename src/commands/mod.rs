/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes two command modules:

- `run`: The looping bot and its single-cycle variant
- `estimate`: Local cost estimation without network access
*/

use crate::api::{ChatApi, WebChatClient};
use crate::config::Config;
use crate::error::Result;
use crate::runner::{CycleOutcome, RunSummary, Runner};

// Local cost estimation
pub mod estimate;

// Bot loop command handlers
pub mod run {
    //! Bot loop handlers.
    //!
    //! Builds the HTTP client and the runner from configuration and drives
    //! either the cancellable loop or a single cycle.

    use super::*;
    use prettytable::{cell, row, Table};
    use tokio_util::sync::CancellationToken;

    /// Run the bot loop until Ctrl-C or `max_cycles`
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `max_cycles` - Optional cycle cap
    /// * `seed` - Optional seed for topic choice and backoff
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the client or
    /// tokenizer cannot be built. Cycle failures never end the loop.
    pub async fn run_bot(config: Config, max_cycles: Option<u64>, seed: Option<u64>) -> Result<()> {
        config.validate()?;
        let api = WebChatClient::new(&config)?;

        let cancel = CancellationToken::new();
        let signal_token = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Ctrl-C received, finishing current cycle");
                    signal_token.cancel();
                }
                Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
            }
        });

        let summary = run_bot_with(api, config, cancel, max_cycles, seed).await?;
        println!();
        summary_table(&summary).printstd();
        Ok(())
    }

    /// Run the loop against any [`ChatApi`]
    ///
    /// # Errors
    ///
    /// Returns error if the tokenizer cannot be loaded.
    pub async fn run_bot_with<A: ChatApi>(
        api: A,
        config: Config,
        cancel: CancellationToken,
        max_cycles: Option<u64>,
        seed: Option<u64>,
    ) -> Result<RunSummary> {
        let mut runner = Runner::with_seed(api, config, seed)?;
        tracing::info!("[+] Bot started");

        let summary = runner.run(cancel, max_cycles).await;

        tracing::info!(
            "[+] Bot stopped after {} cycles ({} completed, {} create failures, {} send failures)",
            summary.cycles,
            summary.completed,
            summary.create_failures,
            summary.send_failures
        );
        Ok(summary)
    }

    /// Run exactly one cycle without sleeping
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the cycle fails.
    pub async fn run_once(config: Config, seed: Option<u64>) -> Result<()> {
        config.validate()?;
        let api = WebChatClient::new(&config)?;
        let currency = config.pricing.currency.clone();

        let outcome = run_once_with(api, config, seed).await?;
        if let CycleOutcome::Completed(report) = &outcome {
            println!(
                "Conversation {} ({}): {} input tokens, {} output tokens, cost {:.6}{}",
                report.conversation_id,
                report.topic,
                report.input.tokens,
                report.output.tokens,
                report.cost(),
                currency
            );
        }
        outcome_result(outcome)
    }

    /// Run one cycle against any [`ChatApi`]
    ///
    /// # Errors
    ///
    /// Returns error if the tokenizer cannot be loaded. A failed cycle is
    /// returned as an outcome, not an error.
    pub async fn run_once_with<A: ChatApi>(
        api: A,
        config: Config,
        seed: Option<u64>,
    ) -> Result<CycleOutcome> {
        let mut runner = Runner::with_seed(api, config, seed)?;
        Ok(runner.run_cycle().await)
    }

    /// Turn a failed cycle into an error
    pub fn outcome_result(outcome: CycleOutcome) -> Result<()> {
        match outcome {
            CycleOutcome::Completed(_) => Ok(()),
            CycleOutcome::CreateFailed(e) => Err(e.context("cycle failed creating conversation")),
            CycleOutcome::SendFailed {
                conversation_id,
                error,
                ..
            } => Err(error.context(format!(
                "cycle failed sending message to conversation {}",
                conversation_id
            ))),
        }
    }

    /// Session summary printed when the loop stops
    pub fn summary_table(summary: &RunSummary) -> Table {
        let mut table = Table::new();
        table.add_row(row!["Cycles", "Completed", "Create Failures", "Send Failures"]);
        table.add_row(row![
            summary.cycles,
            summary.completed,
            summary.create_failures,
            summary.send_failures
        ]);
        table.add_row(row!["Input Tokens", "Output Tokens", "Input Cost", "Output Cost"]);
        table.add_row(row![
            summary.cost.input_tokens,
            summary.cost.output_tokens,
            format!("{:.6}", summary.cost.input_cost),
            format!("{:.6}", summary.cost.output_cost)
        ]);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::run::*;
    use crate::test_utils::{assert_error_contains, test_config, FakeChatApi};
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_run_once_with_completes() {
        let api = FakeChatApi::replying("Once upon a time");
        let outcome = run_once_with(api.clone(), test_config(), Some(3))
            .await
            .unwrap();
        assert!(outcome.is_completed());
        assert_eq!(api.calls().len(), 3);
        assert!(outcome_result(outcome).is_ok());
    }

    #[tokio::test]
    async fn test_run_once_with_create_failure_is_error() {
        let api = FakeChatApi {
            fail_create: true,
            ..FakeChatApi::replying("")
        };
        let outcome = run_once_with(api, test_config(), Some(3)).await.unwrap();
        assert_error_contains(outcome_result(outcome), "creating conversation");
    }

    #[tokio::test]
    async fn test_run_once_with_send_failure_is_error() {
        let api = FakeChatApi {
            fail_send: true,
            ..FakeChatApi::replying("")
        };
        let outcome = run_once_with(api, test_config(), Some(3)).await.unwrap();
        assert_error_contains(outcome_result(outcome), "conversation 42");
    }

    #[tokio::test]
    async fn test_run_bot_with_respects_cycle_cap() {
        let api = FakeChatApi::replying("The end.");
        let summary = run_bot_with(
            api.clone(),
            test_config(),
            CancellationToken::new(),
            Some(2),
            Some(5),
        )
        .await
        .unwrap();
        assert_eq!(summary.cycles, 2);
        assert_eq!(summary.completed, 2);
        assert!(!summary.cancelled);
        assert_eq!(api.calls().len(), 6);
    }

    #[tokio::test]
    async fn test_run_bot_without_credentials_fails() {
        let mut config = test_config();
        config.session.auth_session.clear();
        assert_error_contains(run_bot(config, Some(1), None).await, "auth_session");
    }

    #[test]
    fn test_summary_table_layout() {
        let summary = crate::runner::RunSummary {
            cycles: 3,
            completed: 2,
            send_failures: 1,
            ..Default::default()
        };
        let table = summary_table(&summary);
        assert_eq!(table.len(), 4);
        let rendered = table.to_string();
        assert!(rendered.contains("Create Failures"));
        assert!(rendered.contains("Output Cost"));
    }
}
