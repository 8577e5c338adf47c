//! `fluxnode logs`: Capture a bounded window of container logs.

use std::process::ExitCode;

use clap::Args;
use fluxnode_common::config::FluxConfig;
use fluxnode_common::types::ContainerRef;
use fluxnode_runtime::engine::Engine;

use crate::output;

/// Arguments for the `logs` command.
#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Container ID or name.
    pub container: String,

    /// Print the captured text instead of the JSON envelope.
    #[arg(long)]
    pub raw: bool,
}

/// Executes the `logs` command.
///
/// # Errors
///
/// Returns an error if the Docker client cannot be built.
pub async fn execute(args: LogsArgs, config: &FluxConfig) -> anyhow::Result<ExitCode> {
    let engine = Engine::docker(config)?;
    let container = ContainerRef::new(args.container);
    let result = engine.logs(&container).await.map(|c| c.text);
    output::emit_text(result, args.raw)
}
