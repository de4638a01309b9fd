//! Check modules and the registry that wires them to rule categories.
//!
//! Every check implements [`Check`]: it names its category (which is also its
//! key in the rule document), knows how to turn that category's parameters
//! into typed [`CheckRules`], and validates a [`RecordSource`] against them.
//! Adding a category means adding one `Check` implementation, one
//! `CheckRules` variant and one entry in [`CheckRegistry::builtin`].

pub mod completeness;
pub mod consistency;
pub mod cross_reference;
pub mod format;

use thiserror::Error;

use crate::config::rules::CheckRules;
use crate::findings::{Finding, Severity};
use crate::model::RecordSource;

pub use completeness::CompletenessCheck;
pub use consistency::ConsistencyCheck;
pub use cross_reference::CrossReferenceCheck;
pub use format::FormatCheck;

/// Internal failure of a check. The engine turns it into a finding.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("check '{check}' received rules for another category")]
    RulesMismatch { check: &'static str },
    #[error("invalid rule parameter: {0}")]
    InvalidRule(String),
    #[error("{0}")]
    Internal(String),
}

/// A finding code a check may emit, with its default severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeInfo {
    pub code: &'static str,
    pub severity: Severity,
    pub summary: &'static str,
}

/// One independent category of validation.
pub trait Check: Send + Sync {
    /// Category name and rule-document key.
    fn category(&self) -> &'static str;

    /// Codes this check can emit.
    fn codes(&self) -> &'static [CodeInfo];

    /// Rules used when the document does not mention the category.
    fn default_rules(&self) -> CheckRules;

    /// Parse the category's parameters (without `enabled` / `severity`).
    fn parse_rules(&self, value: serde_json::Value) -> Result<CheckRules, String>;

    fn check(
        &self,
        records: &dyn RecordSource,
        rules: &CheckRules,
    ) -> Result<Vec<Finding>, CheckError>;
}

/// Ordered set of registered checks, keyed by category name.
pub struct CheckRegistry {
    checks: Vec<Box<dyn Check>>,
}

impl CheckRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// The four built-in categories.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(FormatCheck));
        registry.register(Box::new(CompletenessCheck));
        registry.register(Box::new(ConsistencyCheck));
        registry.register(Box::new(CrossReferenceCheck));
        registry
    }

    /// Register a check, replacing any check with the same category.
    pub fn register(&mut self, check: Box<dyn Check>) {
        let category = check.category();
        self.checks.retain(|c| c.category() != category);
        self.checks.push(check);
        self.checks.sort_by_key(|c| c.category());
    }

    pub fn get(&self, category: &str) -> Option<&dyn Check> {
        self.checks
            .iter()
            .find(|c| c.category() == category)
            .map(|c| c.as_ref())
    }

    pub fn contains(&self, category: &str) -> bool {
        self.get(category).is_some()
    }

    /// Registered checks in alphabetical category order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Check> {
        self.checks.iter().map(|c| c.as_ref())
    }

    /// Registered category names in alphabetical order.
    pub fn categories(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.category()).collect()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Default severity of `code` in `codes`, falling back to warning.
pub(crate) fn default_severity(codes: &[CodeInfo], code: &str) -> Severity {
    codes
        .iter()
        .find(|c| c.code == code)
        .map(|c| c.severity)
        .unwrap_or(Severity::Warning)
}
