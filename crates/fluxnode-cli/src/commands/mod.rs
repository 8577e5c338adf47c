//! CLI command definitions and dispatch.

pub mod exec;
pub mod logs;
pub mod serve;
pub mod usage;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fluxnode_common::config::FluxConfig;

/// fluxnode: node telemetry with bounded container capture and usage scoring.
#[derive(Parser, Debug)]
#[command(name = "fluxnode", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to a JSON configuration file.
    #[arg(long, global = true, env = "FLUXNODE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Capture budget in milliseconds, overriding the configuration.
    #[arg(long, global = true)]
    pub capture_timeout_ms: Option<u64>,

    /// Path to the state document, overriding the configuration.
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API.
    Serve(serve::ServeArgs),
    /// Capture a bounded window of container logs.
    Logs(logs::LogsArgs),
    /// Run a command in a container and capture its output.
    Exec(exec::ExecArgs),
    /// Print the current node usage score.
    Usage(usage::UsageArgs),
}

impl Cli {
    /// Loads the configuration file, if any, then applies flag overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or the result is
    /// invalid.
    pub fn load_config(&self) -> anyhow::Result<FluxConfig> {
        let mut config = match &self.config {
            Some(path) => load_file(path)?,
            None => FluxConfig::default(),
        };
        if let Some(ms) = self.capture_timeout_ms {
            config.capture_timeout_ms = ms;
        }
        if let Some(path) = &self.state_file {
            config.state_file.clone_from(path);
        }
        config.validate()?;
        Ok(config)
    }
}

fn load_file(path: &Path) -> anyhow::Result<FluxConfig> {
    FluxConfig::load(path).with_context(|| format!("loading config from {}", path.display()))
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the command cannot
/// start. Operation failures are reported in the printed envelope and the
/// exit code instead.
pub async fn execute(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = cli.load_config()?;
    match cli.command {
        Command::Serve(args) => {
            args.apply(&mut config)?;
            serve::execute(config).await
        }
        Command::Logs(args) => logs::execute(args, &config).await,
        Command::Exec(args) => exec::execute(args, &config).await,
        Command::Usage(args) => usage::execute(args, &config).await,
    }
}
