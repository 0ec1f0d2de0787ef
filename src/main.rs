//! Storyloop - looping chat bot client
//!
#![doc = "Storyloop - looping chat bot client"]
#![doc = "Main entry point for the Storyloop application."]

use anyhow::Result;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use storyloop::cli::{Cli, Commands};
use storyloop::commands;
use storyloop::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/storyloop.yaml");
    let config = Config::load(config_path, &cli)?;

    // Execute command
    match cli.command_or_default() {
        Commands::Run { max_cycles, seed } => {
            tracing::info!("Starting bot loop");
            if let Some(max) = max_cycles {
                tracing::debug!("Cycle limit: {}", max);
            }
            if let Some(seed) = seed {
                tracing::debug!("Using seed: {}", seed);
            }
            commands::run::run_bot(config, max_cycles, seed).await?;
            Ok(())
        }
        Commands::Once { seed } => {
            tracing::info!("Running a single cycle");
            commands::run::run_once(config, seed).await?;
            Ok(())
        }
        Commands::Estimate {
            input,
            output,
            json,
        } => {
            commands::estimate::estimate(&config, &input, &output, json)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug output.
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose {
        "storyloop=debug"
    } else {
        "storyloop=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
