//! CLI entry point for gedlint.

mod cli;
mod cmd;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};
use cmd::check::CheckOptions;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbosity);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::from(2)
        }
    }
}

/// Logs go to stderr. `GEDLINT_LOG` (or `RUST_LOG`) overrides the level
/// picked from `-q` / `-v`.
fn init_tracing(quiet: bool, verbosity: u8) {
    let default = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "gedlint=debug",
        (false, _) => "gedlint=trace",
    };
    let filter = EnvFilter::try_from_env("GEDLINT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Check {
            gedcom,
            config,
            output,
            format,
            parallel,
            timeout_secs,
            fail_on,
        } => {
            let opts = CheckOptions {
                gedcom,
                config,
                output,
                format,
                parallel,
                timeout_secs,
                fail_on,
                quiet: cli.quiet,
            };
            let failed = cmd::check::cmd_check(&opts)?;
            Ok(if failed {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Rules => cmd::rules::cmd_rules().map(|_| ExitCode::SUCCESS),
        Commands::Init { path, force } => {
            cmd::init::cmd_init(&path, force, cli.quiet).map(|_| ExitCode::SUCCESS)
        }
        Commands::Version => cmd_version(cli.verbosity > 0).map(|_| ExitCode::SUCCESS),
        Commands::Completions { shell } => cmd_completions(shell).map(|_| ExitCode::SUCCESS),
    }
}

fn cmd_version(verbose: bool) -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    println!("gedlint {}", VERSION);

    if verbose {
        const GIT_SHA: &str = env!("GIT_SHA");
        const BUILD_DATE: &str = env!("BUILD_DATE");
        println!("commit: {}", GIT_SHA);
        println!("built: {}", BUILD_DATE);
    }

    Ok(())
}

fn cmd_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "gedlint", &mut io::stdout());
    Ok(())
}
