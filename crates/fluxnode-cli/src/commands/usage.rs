//! `fluxnode usage`: Print the current node usage score.

use std::process::ExitCode;

use clap::Args;
use fluxnode_common::config::FluxConfig;
use fluxnode_common::error::Result;
use fluxnode_common::types::UsageScore;
use fluxnode_usage::aggregator::UsageAggregator;

use crate::output;

/// Arguments for the `usage` command.
#[derive(Args, Debug)]
pub struct UsageArgs {
    /// Also log the gathered signals.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Executes the `usage` command.
///
/// # Errors
///
/// Returns an error if the chain RPC client cannot be built.
pub async fn execute(args: UsageArgs, config: &FluxConfig) -> anyhow::Result<ExitCode> {
    let aggregator = UsageAggregator::from_config(config)?;
    output::emit(score(&aggregator, args.verbose).await)
}

/// Samples the signals once and scores that sample.
async fn score(aggregator: &UsageAggregator, verbose: bool) -> Result<UsageScore> {
    let sample = aggregator.sample().await?;
    if verbose {
        tracing::info!(?sample, "load signals");
    }
    Ok(aggregator.score(&sample))
}
