//! Findings model shared by every check.
//!
//! A [`Finding`] is a single reported data-quality issue. Checks create them,
//! the engine collects them into an ordered [`Findings`] sequence, and the
//! report renderer consumes that sequence. Findings are never mutated once a
//! check has returned them, apart from the engine applying a configured
//! severity override.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Category tag used for findings produced while loading rules.
pub const CONFIG_CATEGORY: &str = "config";
/// Category tag used for findings synthesised when a check fails.
pub const ENGINE_CATEGORY: &str = "engine";

/// How serious a finding is.
///
/// Ordered so that `Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// All severities, most serious first.
    pub const DESCENDING: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Info];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            other => Err(format!(
                "unknown severity '{}' (expected info, warning or error)",
                other
            )),
        }
    }
}

/// Where a finding points.
///
/// Variant order is significant: it is the primary key when findings are
/// sorted by location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    /// A rule-configuration category, optionally narrowed to one parameter.
    Config {
        category: String,
        field: Option<String>,
    },
    Individual {
        id: String,
        field: Option<String>,
    },
    Family {
        id: String,
        field: Option<String>,
    },
    /// A chain of individuals, e.g. an ancestry cycle `A -> B -> C -> A`.
    Path { ids: Vec<String> },
}

impl Location {
    pub fn individual(id: impl Into<String>) -> Self {
        Location::Individual {
            id: id.into(),
            field: None,
        }
    }

    pub fn individual_field(id: impl Into<String>, field: impl Into<String>) -> Self {
        Location::Individual {
            id: id.into(),
            field: Some(field.into()),
        }
    }

    pub fn family(id: impl Into<String>) -> Self {
        Location::Family {
            id: id.into(),
            field: None,
        }
    }

    pub fn family_field(id: impl Into<String>, field: impl Into<String>) -> Self {
        Location::Family {
            id: id.into(),
            field: Some(field.into()),
        }
    }

    pub fn config(category: impl Into<String>, field: Option<String>) -> Self {
        Location::Config {
            category: category.into(),
            field,
        }
    }

    pub fn path(ids: Vec<String>) -> Self {
        Location::Path { ids }
    }

    /// Identifier of the record this location refers to, if any.
    pub fn record_id(&self) -> Option<&str> {
        match self {
            Location::Individual { id, .. } | Location::Family { id, .. } => Some(id),
            Location::Path { ids } => ids.first().map(String::as_str),
            Location::Config { .. } => None,
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            Location::Individual { field, .. }
            | Location::Family { field, .. }
            | Location::Config { field, .. } => field.as_deref(),
            Location::Path { .. } => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (prefix, id, field) = match self {
            Location::Config { category, field } => ("config", category.as_str(), field),
            Location::Individual { id, field } => ("INDI", id.as_str(), field),
            Location::Family { id, field } => ("FAM", id.as_str(), field),
            Location::Path { ids } => return write!(f, "{}", ids.join(" -> ")),
        };
        match field {
            Some(field) => write!(f, "{}:{}/{}", prefix, id, field),
            None => write!(f, "{}:{}", prefix, id),
        }
    }
}

/// A single reported data-quality issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    /// Check category that produced the finding (`format`, `consistency`, ...).
    pub category: String,
    /// Stable machine-readable code, e.g. `death-before-birth`.
    pub code: String,
    pub message: String,
    pub location: Location,
    /// The raw value that triggered the finding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Finding {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        code: impl Into<String>,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            code: code.into(),
            message: message.into(),
            location,
            value: None,
            suggestion: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Key for [`Findings::group_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Category,
    Severity,
}

/// Per-severity totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.info
    }
}

/// Ordered sequence of findings produced by one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Findings(Vec<Finding>);

impl Findings {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, finding: Finding) {
        self.0.push(finding);
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.0.extend(findings);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Finding] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Finding> {
        self.0
    }

    /// Findings carrying the given code, in emission order.
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.0.iter().filter(move |f| f.code == code)
    }

    pub fn counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for finding in &self.0 {
            match finding.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Info => counts.info += 1,
            }
        }
        counts
    }

    /// Highest severity present, `None` when there are no findings.
    pub fn max_severity(&self) -> Option<Severity> {
        self.0.iter().map(|f| f.severity).max()
    }

    /// Group findings by category or severity.
    ///
    /// Category groups follow first-appearance order, which is the engine's
    /// check order. Severity groups run from error down to info. Findings
    /// inside a group keep their emission order. Empty groups are omitted.
    pub fn group_by(&self, key: GroupBy) -> Vec<(String, Vec<&Finding>)> {
        match key {
            GroupBy::Category => {
                let mut groups: Vec<(String, Vec<&Finding>)> = Vec::new();
                for finding in &self.0 {
                    match groups.iter_mut().find(|(name, _)| *name == finding.category) {
                        Some((_, members)) => members.push(finding),
                        None => groups.push((finding.category.clone(), vec![finding])),
                    }
                }
                groups
            }
            GroupBy::Severity => Severity::DESCENDING
                .iter()
                .filter_map(|severity| {
                    let members: Vec<&Finding> =
                        self.0.iter().filter(|f| f.severity == *severity).collect();
                    (!members.is_empty()).then(|| (severity.to_string(), members))
                })
                .collect(),
        }
    }

    /// Findings sorted by location, then by severity (most serious first).
    ///
    /// The sort is stable, so ties keep emission order.
    pub fn sorted(&self) -> Vec<&Finding> {
        let mut sorted: Vec<&Finding> = self.0.iter().collect();
        sorted.sort_by(|a, b| match a.location.cmp(&b.location) {
            Ordering::Equal => b.severity.cmp(&a.severity),
            other => other,
        });
        sorted
    }
}

impl From<Vec<Finding>> for Findings {
    fn from(findings: Vec<Finding>) -> Self {
        Self(findings)
    }
}

impl IntoIterator for Findings {
    type Item = Finding;
    type IntoIter = std::vec::IntoIter<Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Findings {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
