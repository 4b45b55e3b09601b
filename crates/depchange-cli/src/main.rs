use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use depchange_core::ActionConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod actions;
mod app;

use actions::ActionsChannel;
use app::RunOptions;

#[derive(Parser, Debug)]
#[command(name = "depchange")]
#[command(
    about = "Report whether a file or anything it imports changed in the latest commit",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Target file, relative to the workspace root
    #[arg(long, env = "INPUT_FILEPATH")]
    file_path: Option<String>,

    /// Module-resolution config (defaults to <workspace>/tsconfig.json)
    #[arg(long, env = "INPUT_TSCONFIGPATH")]
    ts_config_path: Option<String>,

    /// Workspace root (repository checkout)
    #[arg(long, env = "GITHUB_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Extra glob, relative to the workspace, to leave out of the closure
    #[arg(long = "exclude", value_name = "GLOB")]
    excludes: Vec<String>,

    /// Print the full detection report as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            config: ActionConfig {
                file_path: self.file_path.clone(),
                ts_config_path: self.ts_config_path.clone(),
                workspace_root: self.workspace.clone(),
            },
            excludes: self.excludes.clone(),
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let fallback = format!(
        "depchange={level},depchange_core={level},depchange_git={level},depchange_parser={level}"
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn execute(cli: &Cli, channel: &mut ActionsChannel<std::io::Stdout>) -> Result<()> {
    let detection = app::run(&cli.run_options(), channel)?;
    if cli.json {
        if let Some(detection) = detection {
            let report =
                serde_json::to_string_pretty(&detection).context("serializing detection report")?;
            println!("{report}");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut channel = ActionsChannel::from_env();
    if let Err(e) = execute(&cli, &mut channel) {
        // The channel itself may be what failed; fall back to stderr.
        if channel.set_failed(format!("{e:#}")).is_err() {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    }
    channel.exit_code()
}
