//! Validate a GEDCOM file and render the report

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use gedlint::config::RuleConfiguration;
use gedlint::engine::ValidationEngine;
use gedlint::findings::Findings;
use gedlint::gedcom;
use gedlint::report::{render_json, render_text, ReportContext};

use crate::cli::{FailOn, OutputFormat};

pub struct CheckOptions {
    pub gedcom: PathBuf,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub parallel: bool,
    pub timeout_secs: Option<u64>,
    pub fail_on: FailOn,
    pub quiet: bool,
}

/// Returns true when a finding at or above the fail-on threshold exists.
pub fn cmd_check(opts: &CheckOptions) -> Result<bool> {
    let rules = match &opts.config {
        Some(path) => RuleConfiguration::load(path)
            .with_context(|| format!("Failed to load rules from {}", path.display()))?,
        None => RuleConfiguration::defaults(),
    };

    let records = gedcom::load_file(&opts.gedcom)
        .with_context(|| format!("Failed to load {}", opts.gedcom.display()))?;

    let engine = ValidationEngine::new().with_parallel(opts.parallel);
    let findings = match opts.timeout_secs {
        Some(secs) => {
            let deadline = Instant::now() + Duration::from_secs(secs);
            let report = engine.run_with_deadline(&records, &rules, deadline);
            if report.interrupted && !opts.quiet {
                eprintln!(
                    "{} Timed out after {}s; skipped: {}",
                    "⚠".yellow(),
                    secs,
                    report.skipped.join(", ")
                );
            }
            report.findings
        }
        None => engine.run(&records, &rules),
    };

    let rendered = render(&findings, opts)?;
    match &opts.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !opts.quiet {
                let counts = findings.counts();
                println!(
                    "{} Report written to {} ({} errors, {} warnings, {} info)",
                    "✓".green(),
                    path.display(),
                    counts.errors,
                    counts.warnings,
                    counts.info
                );
            }
        }
        None => print!("{}", rendered),
    }

    let failed = opts
        .fail_on
        .threshold()
        .is_some_and(|threshold| findings.max_severity().is_some_and(|max| max >= threshold));
    Ok(failed)
}

fn render(findings: &Findings, opts: &CheckOptions) -> Result<String> {
    match opts.format {
        OutputFormat::Json => Ok(render_json(findings)? + "\n"),
        OutputFormat::Text => {
            let mut ctx = ReportContext::new(absolute(&opts.gedcom))
                .with_color(opts.output.is_none() && atty::is(atty::Stream::Stdout));
            if let Some(config) = &opts.config {
                ctx = ctx.with_config(absolute(config));
            }
            Ok(render_text(findings, &ctx) + "\n")
        }
    }
}

fn absolute(path: &std::path::Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
