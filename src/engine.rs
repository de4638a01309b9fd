//! Validation engine.
//!
//! Runs every enabled check over a record source and merges the results into
//! one ordered [`Findings`] sequence. Configuration findings come first, then
//! each check's findings in execution order: categories listed in the
//! configuration's `order`, then the remaining registered categories
//! alphabetically. A check that errors or panics is reported as a single
//! `check-failed` finding and the run continues.

use rayon::prelude::*;
use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::checks::{Check, CheckRegistry, CodeInfo};
use crate::config::{CheckRules, RuleConfiguration, SeverityOverride};
use crate::findings::{Finding, Findings, Location, Severity, ENGINE_CATEGORY};
use crate::model::RecordSource;

/// Codes of findings the engine emits itself.
pub const CODES: &[CodeInfo] = &[CodeInfo {
    code: "check-failed",
    severity: Severity::Error,
    summary: "a check returned an error or panicked; its category has no results",
}];

/// Outcome of a deadline-bounded run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub findings: Findings,
    /// Categories whose check ran (successfully or not).
    pub completed: Vec<String>,
    /// Enabled categories not run because the deadline passed.
    pub skipped: Vec<String>,
    pub interrupted: bool,
}

/// A check ready to run with its resolved rules.
struct Planned<'a> {
    check: &'a dyn Check,
    rules: Cow<'a, CheckRules>,
    severity: Option<&'a SeverityOverride>,
}

pub struct ValidationEngine {
    registry: CheckRegistry,
    parallel: bool,
}

impl ValidationEngine {
    /// Engine over the built-in checks.
    pub fn new() -> Self {
        Self::with_registry(CheckRegistry::builtin())
    }

    pub fn with_registry(registry: CheckRegistry) -> Self {
        Self {
            registry,
            parallel: false,
        }
    }

    /// Run checks on the rayon pool. Output order is unchanged.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Registered categories in the order they run under `config`.
    pub fn execution_order(&self, config: &RuleConfiguration) -> Vec<&'static str> {
        let mut order: Vec<&'static str> = config
            .order()
            .iter()
            .filter_map(|name| self.registry.get(name).map(|c| c.category()))
            .collect();
        for category in self.registry.categories() {
            if !order.contains(&category) {
                order.push(category);
            }
        }
        order
    }

    /// Validate `records` against `config`.
    pub fn run(&self, records: &dyn RecordSource, config: &RuleConfiguration) -> Findings {
        self.execute(records, config, None).findings
    }

    /// Like [`run`](Self::run), but stops starting new checks once `deadline`
    /// has passed. A check already running is allowed to finish.
    pub fn run_with_deadline(
        &self,
        records: &dyn RecordSource,
        config: &RuleConfiguration,
        deadline: Instant,
    ) -> RunReport {
        self.execute(records, config, Some(deadline))
    }

    fn plan<'a>(&'a self, config: &'a RuleConfiguration) -> Vec<Planned<'a>> {
        let mut planned = Vec::new();

        for category in self.execution_order(config) {
            let Some(check) = self.registry.get(category) else {
                continue;
            };
            match config.category(category) {
                None => planned.push(Planned {
                    check,
                    rules: Cow::Owned(check.default_rules()),
                    severity: None,
                }),
                Some(entry) if !entry.enabled => {
                    debug!(category, "skipping disabled check");
                }
                Some(entry) => match entry.rules() {
                    Some(rules) => planned.push(Planned {
                        check,
                        rules: Cow::Borrowed(rules),
                        severity: entry.severity.as_ref(),
                    }),
                    None => debug!(category, "skipping misconfigured check"),
                },
            }
        }

        planned
    }

    fn execute(
        &self,
        records: &dyn RecordSource,
        config: &RuleConfiguration,
        deadline: Option<Instant>,
    ) -> RunReport {
        let started = Instant::now();
        let planned = self.plan(config);
        info!(
            individuals = records.individual_count(),
            families = records.family_count(),
            checks = planned.len(),
            parallel = self.parallel,
            "validation started"
        );

        let expired = || deadline.is_some_and(|d| Instant::now() >= d);

        let outcomes: Vec<Option<Vec<Finding>>> = if self.parallel {
            planned
                .par_iter()
                .map(|p| (!expired()).then(|| run_check(p, records)))
                .collect()
        } else {
            planned
                .iter()
                .map(|p| (!expired()).then(|| run_check(p, records)))
                .collect()
        };

        let mut report = RunReport {
            findings: Findings::from(config.diagnostics().to_vec()),
            ..Default::default()
        };
        for (planned, outcome) in planned.iter().zip(outcomes) {
            let category = planned.check.category().to_string();
            match outcome {
                Some(findings) => {
                    report.findings.extend(findings);
                    report.completed.push(category);
                }
                None => report.skipped.push(category),
            }
        }
        report.interrupted = !report.skipped.is_empty();

        if report.interrupted {
            warn!(skipped = ?report.skipped, "deadline passed, checks skipped");
        }
        let counts = report.findings.counts();
        info!(
            errors = counts.errors,
            warnings = counts.warnings,
            info = counts.info,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "validation finished"
        );

        report
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn run_check(planned: &Planned<'_>, records: &dyn RecordSource) -> Vec<Finding> {
    let category = planned.check.category();
    let started = Instant::now();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        planned.check.check(records, &planned.rules)
    }));

    match outcome {
        Ok(Ok(mut findings)) => {
            if let Some(severity) = planned.severity {
                for finding in &mut findings {
                    severity.apply(finding);
                }
            }
            debug!(
                category,
                findings = findings.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "check finished"
            );
            findings
        }
        Ok(Err(err)) => {
            warn!(category, error = %err, "check failed");
            vec![check_failed(category, &err.to_string())]
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(category, panic = %message, "check panicked");
            vec![check_failed(category, &format!("panicked: {}", message))]
        }
    }
}

fn check_failed(category: &str, reason: &str) -> Finding {
    Finding::new(
        Severity::Error,
        ENGINE_CATEGORY,
        "check-failed",
        Location::config(category, None),
        format!("Check '{}' did not complete: {}", category, reason),
    )
    .with_suggestion("Other checks ran normally; results for this category are missing")
}
