//! `fluxnode exec`: Run a command in a container and capture its output.

use std::process::ExitCode;

use clap::Args;
use fluxnode_common::config::FluxConfig;
use fluxnode_common::types::{ContainerRef, ExecRequest};
use fluxnode_runtime::engine::Engine;

use crate::output;

/// Arguments for the `exec` command.
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Container ID or name.
    pub container: String,

    /// Environment entry as `KEY=value`; repeatable.
    #[arg(short, long = "env")]
    pub env: Vec<String>,

    /// Print the captured text instead of the JSON envelope.
    #[arg(long)]
    pub raw: bool,

    /// Command and arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Executes the `exec` command.
///
/// The command runs for at most the capture budget; output produced after
/// that is discarded.
///
/// # Errors
///
/// Returns an error if the Docker client cannot be built.
pub async fn execute(args: ExecArgs, config: &FluxConfig) -> anyhow::Result<ExitCode> {
    let engine = Engine::docker(config)?;
    let request = ExecRequest::new(
        ContainerRef::new(args.container),
        Some(args.command),
        Some(args.env),
    );
    let result = engine.exec(&request).await.map(|c| c.text);
    output::emit_text(result, args.raw)
}
