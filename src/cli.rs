//! CLI argument definitions for gedlint.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use gedlint::findings::Severity;

#[derive(Parser)]
#[command(name = "gedlint")]
#[command(version)]
#[command(about = "Validate GEDCOM genealogy files against data-quality rules", long_about = None)]
#[command(
    after_help = "GETTING STARTED:\n    gedlint init                Write a default rules file (gedlint.json)\n    gedlint check tree.ged      Validate with built-in rules\n    gedlint check tree.ged -c gedlint.json --format json"
)]
pub struct Cli {
    /// Suppress all non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log detail (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a GEDCOM file
    Check {
        /// GEDCOM file to validate
        #[arg(value_name = "GEDCOM")]
        gedcom: PathBuf,
        /// Rules file (.json, .yml or .yaml); built-in defaults when omitted
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Write the report to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Run checks in parallel
        #[arg(long)]
        parallel: bool,
        /// Stop starting new checks after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,
        /// Exit with status 1 when a finding at or above this severity exists
        #[arg(long, value_enum, default_value_t = FailOn::Error)]
        fail_on: FailOn,
    },
    /// List check categories and the finding codes they emit
    Rules,
    /// Write a rules file with every default spelled out
    Init {
        /// Destination (.json, .yml or .yaml)
        #[arg(default_value = "gedlint.json")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show version information (with -v: commit and build date)
    Version,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailOn {
    Error,
    Warning,
    Info,
    Never,
}

impl FailOn {
    /// Lowest severity that fails the run.
    pub fn threshold(self) -> Option<Severity> {
        match self {
            FailOn::Error => Some(Severity::Error),
            FailOn::Warning => Some(Severity::Warning),
            FailOn::Info => Some(Severity::Info),
            FailOn::Never => None,
        }
    }
}
