//! Bot control loop
//!
//! One cycle opens a conversation, sends a single generated message, prices
//! the exchange, and deletes the conversation. [`Runner::run`] repeats cycles
//! with a randomized sleep in between until it is cancelled or reaches its
//! cycle cap. Errors never end the loop; they only select the longer sleep.

use crate::api::ChatApi;
use crate::backoff::{Backoff, BackoffKind};
use crate::config::Config;
use crate::cost::{CostEstimator, SessionCost, TokenCost, TokenDirection};
use crate::error::Result;
use crate::prompts::StoryPrompts;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::metrics::{record_backoff, record_tokens, CycleMetrics};

/// Result of a successful cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    /// Conversation used (and deleted) by the cycle
    pub conversation_id: i64,
    /// Topic embedded in the message
    pub topic: String,
    /// Cost of the outgoing message
    pub input: TokenCost,
    /// Cost of the reply
    pub output: TokenCost,
    /// Whether the delete call succeeded
    pub deleted: bool,
    /// Session total after this cycle
    pub session_total: f64,
}

impl CycleReport {
    /// Input plus output cost of this cycle
    pub fn cost(&self) -> f64 {
        self.input.cost + self.output.cost
    }
}

/// How a cycle ended
#[derive(Debug)]
pub enum CycleOutcome {
    /// Message sent and reply received
    Completed(CycleReport),
    /// The conversation could not be created
    CreateFailed(anyhow::Error),
    /// The conversation was created but the message could not be sent
    SendFailed {
        /// Conversation that was opened (and cleaned up)
        conversation_id: i64,
        /// Send error
        error: anyhow::Error,
        /// Cost of the outgoing message, which was recorded
        input: TokenCost,
    },
}

impl CycleOutcome {
    /// Whether the cycle completed
    pub fn is_completed(&self) -> bool {
        matches!(self, CycleOutcome::Completed(_))
    }

    /// Which sleep range follows this outcome
    pub fn backoff_kind(&self) -> BackoffKind {
        if self.is_completed() {
            BackoffKind::Success
        } else {
            BackoffKind::Error
        }
    }

    /// Label used in logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Completed(_) => "completed",
            CycleOutcome::CreateFailed(_) => "create_failed",
            CycleOutcome::SendFailed { .. } => "send_failed",
        }
    }
}

/// Totals over a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Cycles executed
    pub cycles: u64,
    /// Cycles that completed
    pub completed: u64,
    /// Cycles that failed to create a conversation
    pub create_failures: u64,
    /// Cycles that failed to send the message
    pub send_failures: u64,
    /// Whether the run ended through cancellation
    pub cancelled: bool,
    /// Accumulated cost
    pub cost: SessionCost,
}

impl RunSummary {
    fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::Completed(_) => self.completed += 1,
            CycleOutcome::CreateFailed(_) => self.create_failures += 1,
            CycleOutcome::SendFailed { .. } => self.send_failures += 1,
        }
    }
}

/// The bot
///
/// Owns its configuration, API client, estimator, random source and the
/// session cost accumulator. Nothing is shared, so no synchronization is
/// needed.
///
/// # Examples
///
/// ```no_run
/// use storyloop::api::WebChatClient;
/// use storyloop::config::Config;
/// use storyloop::runner::Runner;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> storyloop::error::Result<()> {
/// let config = Config::default();
/// let api = WebChatClient::new(&config)?;
/// let mut runner = Runner::with_seed(api, config, Some(7))?;
/// let summary = runner.run(CancellationToken::new(), Some(1)).await;
/// assert_eq!(summary.cycles, 1);
/// # Ok(())
/// # }
/// ```
pub struct Runner<A: ChatApi> {
    api: A,
    config: Config,
    prompts: StoryPrompts,
    estimator: CostEstimator,
    backoff: Backoff,
    rng: StdRng,
    session: SessionCost,
}

impl<A: ChatApi> Runner<A> {
    /// Create a runner with an explicit estimator and random source
    ///
    /// `config` is expected to have passed [`Config::validate_offline`].
    pub fn new(api: A, config: Config, estimator: CostEstimator, rng: StdRng) -> Self {
        let prompts = StoryPrompts::from_config(&config.prompts);
        let backoff = Backoff::from_config(&config.backoff);
        Self {
            api,
            config,
            prompts,
            estimator,
            backoff,
            rng,
            session: SessionCost::default(),
        }
    }

    /// Create a runner, loading the tokenizer and seeding the random source
    ///
    /// Without a seed the generator is seeded from the operating system.
    /// Session credentials are not checked here; everything else is.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the tokenizer cannot
    /// be loaded.
    pub fn with_seed(api: A, config: Config, seed: Option<u64>) -> Result<Self> {
        config.validate_offline()?;
        let estimator = CostEstimator::new(config.pricing.clone())?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self::new(api, config, estimator, rng))
    }

    /// Accumulated cost so far
    pub fn session_cost(&self) -> &SessionCost {
        &self.session
    }

    /// Configuration the runner was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute a single cycle
    ///
    /// Never returns an error: failures are reported through the outcome.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let metrics = CycleMetrics::new();
        let (topic, message) = {
            let (topic, message) = self.prompts.next_message(&mut self.rng);
            (topic.to_string(), message)
        };
        debug!("Chose topic: {}", topic);

        let conversation = match self
            .api
            .create_conversation(&self.config.model.name, &message)
            .await
        {
            Ok(conversation) => conversation,
            Err(e) => {
                error!("[-] Error creating conversation: {:#}", e);
                metrics.record_outcome("create_failed");
                return CycleOutcome::CreateFailed(e);
            }
        };
        let conversation_id = conversation.id;

        let reply = self.api.send_message(&conversation, &message).await;

        let input = self.charge(&message, TokenDirection::Input);
        let reply = reply.map(|text| self.charge(&text, TokenDirection::Output));

        let deleted = match self.api.delete_conversation(conversation).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to delete conversation {}: {:#}", conversation_id, e);
                false
            }
        };

        info!(
            "Total session I/O cost: {:.4}{}",
            self.session.total(),
            self.config.pricing.currency
        );
        info!("--------------------------");

        match reply {
            Ok(output) => {
                metrics.record_outcome("completed");
                CycleOutcome::Completed(CycleReport {
                    conversation_id,
                    topic,
                    input,
                    output,
                    deleted,
                    session_total: self.session.total(),
                })
            }
            Err(error) => {
                error!("[-] Error sending message: {:#}", error);
                metrics.record_outcome("send_failed");
                CycleOutcome::SendFailed {
                    conversation_id,
                    error,
                    input,
                }
            }
        }
    }

    /// Repeat cycles until cancelled or `max_cycles` is reached
    ///
    /// A cycle that has started always runs to completion so its conversation
    /// is cleaned up; cancellation is observed between cycles and during the
    /// sleep.
    pub async fn run(&mut self, cancel: CancellationToken, max_cycles: Option<u64>) -> RunSummary {
        let mut summary = RunSummary::default();

        loop {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let outcome = self.run_cycle().await;
            summary.record(&outcome);

            if max_cycles.is_some_and(|max| summary.cycles >= max) {
                info!("Reached cycle limit of {}", summary.cycles);
                break;
            }

            let kind = outcome.backoff_kind();
            let delay = self.backoff.delay(kind, &mut self.rng);
            record_backoff(kind, delay);
            info!(
                "[#] sleeping for {}: waiting for next cycle{}",
                format_duration(delay),
                if kind == BackoffKind::Error {
                    " (error)"
                } else {
                    ""
                }
            );

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Cancellation received, stopping");
                    summary.cancelled = true;
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        summary.cost = self.session;
        summary
    }

    fn charge(&mut self, text: &str, direction: TokenDirection) -> TokenCost {
        let estimate = self.estimator.estimate(text, direction);
        info!(
            "[#] {} tokens: {}, cost: {:.4}",
            direction, estimate.tokens, estimate.cost
        );
        self.session.record(&estimate);
        record_tokens(&estimate);
        estimate
    }
}

/// Render a delay as `1h 02m 03s`, `4m 05s` or `6.250s`
pub fn format_duration(delay: Duration) -> String {
    let total = delay.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{}.{:03}s", seconds, delay.subsec_millis())
    }
}
