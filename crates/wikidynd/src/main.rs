mod cli;
mod dumps;
mod dynamics;
mod graph;

use std::io::Write;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use wikidyn_config::{config_path, load_workspace_config, validate_config};

use crate::cli::{Cli, Commands, LogFormat, parse_cli};
use crate::dumps::run_dumps_command;
use crate::dynamics::run_dynamics_command;
use crate::graph::run_graph_command;

fn main() -> Result<()> {
    let cli = parse_cli();
    init_tracing(cli.log_format);
    tracing::debug!(log_format = cli.log_format.as_str(), "tracing initialized");
    run(cli)
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Human => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn run(cli: Cli) -> Result<()> {
    let workspace = cli.workspace.canonicalize().with_context(|| {
        format!(
            "failed to resolve workspace path {}",
            cli.workspace.display()
        )
    })?;

    let config = load_workspace_config(&workspace).with_context(|| {
        format!(
            "failed to load workspace config at {}",
            config_path(&workspace).display()
        )
    })?;
    for warning in validate_config(&config) {
        tracing::warn!(code = warning.code, "{}", warning.message);
    }

    match cli.command {
        Commands::Dynamics(args) => run_dynamics_command(&config, args),
        Commands::Graph(args) => run_graph_command(args),
        Commands::Dumps(args) => run_dumps_command(&config.pageviews, args),
    }
}

pub(crate) fn write_json_to_stdout(value: &serde_json::Value) -> Result<()> {
    let mut out = std::io::stdout();
    serde_json::to_writer_pretty(&mut out, value).context("failed to serialize JSON output")?;
    writeln!(&mut out).context("failed to write trailing newline")?;
    Ok(())
}
