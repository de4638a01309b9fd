//! Report renderers over [`Findings`].
//!
//! Text output groups findings by category in first-appearance order, one
//! block per finding. JSON output is a summary plus the flat findings list.

use chrono::{DateTime, Local};
use colored::Colorize;
use serde::Serialize;

use crate::findings::{Finding, Findings, GroupBy, Severity};

/// Run metadata shown in the text report header.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub gedcom: String,
    /// `None` when running with built-in defaults.
    pub config: Option<String>,
    pub generated: DateTime<Local>,
    pub color: bool,
}

impl ReportContext {
    pub fn new(gedcom: impl Into<String>) -> Self {
        Self {
            gedcom: gedcom.into(),
            config: None,
            generated: Local::now(),
            color: false,
        }
    }

    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = Some(config.into());
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    errors: usize,
    warnings: usize,
    info: usize,
    total: usize,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    summary: Summary,
    findings: &'a Findings,
}

/// Render findings as pretty-printed JSON.
pub fn render_json(findings: &Findings) -> serde_json::Result<String> {
    let counts = findings.counts();
    let report = JsonReport {
        summary: Summary {
            errors: counts.errors,
            warnings: counts.warnings,
            info: counts.info,
            total: counts.total(),
        },
        findings,
    };
    serde_json::to_string_pretty(&report)
}

fn severity_tag(severity: Severity, color: bool) -> String {
    let tag = format!("[{}]", severity);
    if !color {
        return tag;
    }
    match severity {
        Severity::Error => tag.red().bold().to_string(),
        Severity::Warning => tag.yellow().to_string(),
        Severity::Info => tag.cyan().to_string(),
    }
}

fn bold(text: &str, color: bool) -> String {
    if color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn format_finding(finding: &Finding, color: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "  {} {}  {}",
        severity_tag(finding.severity, color),
        finding.code,
        finding.location
    )];
    if let Some(value) = &finding.value {
        lines.push(format!("    {:<12} '{}'", "Value:", value));
    }
    lines.push(format!("    {:<12} {}", "Message:", finding.message));
    if let Some(suggestion) = &finding.suggestion {
        lines.push(format!("    {:<12} {}", "Suggestion:", suggestion));
    }
    lines
}

/// Render the human-readable report.
pub fn render_text(findings: &Findings, ctx: &ReportContext) -> String {
    let title = "Genealogy Data Quality Report";
    let mut output = vec![
        bold(title, ctx.color),
        "=".repeat(title.len()),
        format!("{:<11} {}", "Generated:", ctx.generated.format("%Y-%m-%d %H:%M:%S")),
        format!("{:<11} {}", "GEDCOM:", ctx.gedcom),
        format!(
            "{:<11} {}",
            "Config:",
            ctx.config.as_deref().unwrap_or("(built-in defaults)")
        ),
        String::new(),
    ];

    if findings.is_empty() {
        output.push("No issues found.".to_string());
        return output.join("\n") + "\n";
    }

    let counts = findings.counts();
    output.push(format!(
        "Total findings: {} ({} errors, {} warnings, {} info)",
        counts.total(),
        counts.errors,
        counts.warnings,
        counts.info
    ));
    output.push(String::new());

    for (category, group) in findings.group_by(GroupBy::Category) {
        let heading = format!("{} ({})", category.to_uppercase(), group.len());
        output.push(bold(&heading, ctx.color));
        output.push("─".repeat(heading.chars().count()));
        for finding in group {
            output.extend(format_finding(finding, ctx.color));
            output.push(String::new());
        }
    }

    output.join("\n")
}
