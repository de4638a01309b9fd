//! Rule configuration.
//!
//! A configuration document is JSON or YAML with one section per check
//! category plus the top-level `strict` and `order` keys:
//!
//! ```yaml
//! strict: false
//! order: [format, completeness]
//! format:
//!   name_pattern: "^[A-Z]"
//!   severity: { imprecise-date: warning }
//! consistency:
//!   enabled: false
//! ```
//!
//! Structural problems with the document itself are fatal ([`ConfigError`]).
//! Problems inside a single category are not: the category is marked
//! misconfigured, an `invalid-config` finding is recorded and the remaining
//! categories load normally.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::checks::{format, Check, CheckRegistry, CodeInfo};
use crate::findings::{Finding, Location, Severity, CONFIG_CATEGORY};

pub mod rules;

pub use rules::{
    CheckRules, CompletenessRules, ConsistencyRules, CrossReferenceRules, FamilyField,
    FormatRules, IndividualField, SeverityOverride,
};

/// Top-level keys that are not check categories.
const RESERVED_KEYS: &[&str] = &["strict", "order", "description"];

/// Flat-layout top-level keys folded into the `format` category.
const LEGACY_FORMAT_KEYS: &[(&str, &str)] = &[
    ("preferred_date_formats", "date_formats"),
    ("expected_place_format_structures", "place_structures"),
];

/// Codes of configuration findings.
pub const CODES: &[CodeInfo] = &[
    CodeInfo {
        code: "invalid-config",
        severity: Severity::Error,
        summary: "a category's parameters were rejected; the category is skipped",
    },
    CodeInfo {
        code: "unknown-category",
        severity: Severity::Error,
        summary: "strict mode: unknown top-level key or name in 'order'",
    },
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read rule configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rule configuration: {0}")]
    Parse(String),
    #[error("invalid rule configuration: {0}")]
    Structure(String),
}

/// Serialization of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
}

impl SourceFormat {
    /// `.yml` and `.yaml` are YAML; anything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                SourceFormat::Yaml
            }
            _ => SourceFormat::Json,
        }
    }
}

/// Whether a category's parameters are usable.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryState {
    Ready(CheckRules),
    /// Parameters were rejected; the engine skips the category.
    Misconfigured(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryConfig {
    pub enabled: bool,
    pub severity: Option<SeverityOverride>,
    pub state: CategoryState,
}

impl CategoryConfig {
    fn ready(rules: CheckRules) -> Self {
        Self {
            enabled: true,
            severity: None,
            state: CategoryState::Ready(rules),
        }
    }

    /// Validated rules, or `None` when misconfigured.
    pub fn rules(&self) -> Option<&CheckRules> {
        match &self.state {
            CategoryState::Ready(rules) => Some(rules),
            CategoryState::Misconfigured(_) => None,
        }
    }

    pub fn is_misconfigured(&self) -> bool {
        matches!(self.state, CategoryState::Misconfigured(_))
    }
}

/// Validated rule configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleConfiguration {
    strict: bool,
    order: Vec<String>,
    categories: BTreeMap<String, CategoryConfig>,
    diagnostics: Vec<Finding>,
}

impl RuleConfiguration {
    /// Every built-in category enabled with default parameters.
    pub fn defaults() -> Self {
        Self::defaults_for(&CheckRegistry::builtin())
    }

    pub fn defaults_for(registry: &CheckRegistry) -> Self {
        let categories = registry
            .iter()
            .map(|check| {
                (
                    check.category().to_string(),
                    CategoryConfig::ready(check.default_rules()),
                )
            })
            .collect();

        Self {
            strict: false,
            order: Vec::new(),
            categories,
            diagnostics: Vec::new(),
        }
    }

    /// Load a configuration file for the built-in checks.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with(path, &CheckRegistry::builtin())
    }

    pub fn load_with(path: &Path, registry: &CheckRegistry) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading rule configuration");

        Self::parse_with(&content, SourceFormat::from_path(path), registry)
    }

    pub fn parse(content: &str, format: SourceFormat) -> Result<Self, ConfigError> {
        Self::parse_with(content, format, &CheckRegistry::builtin())
    }

    pub fn parse_with(
        content: &str,
        format: SourceFormat,
        registry: &CheckRegistry,
    ) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Self::parse_value(Value::Object(Map::new()), registry);
        }

        let value: Value = match format {
            SourceFormat::Json => {
                serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            SourceFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
        };

        Self::parse_value(value, registry)
    }

    /// Build a configuration from an already-decoded document.
    pub fn parse_value(value: Value, registry: &CheckRegistry) -> Result<Self, ConfigError> {
        let mut root = match value {
            Value::Object(root) => root,
            other => {
                return Err(ConfigError::Structure(format!(
                    "document root must be an object, found {}",
                    kind_of(&other)
                )))
            }
        };

        let strict = match root.remove("strict") {
            None => false,
            Some(Value::Bool(strict)) => strict,
            Some(other) => {
                return Err(ConfigError::Structure(format!(
                    "'strict' must be a boolean, found {}",
                    kind_of(&other)
                )))
            }
        };

        let requested_order = match root.remove("order") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(name) => Ok(name),
                    other => Err(ConfigError::Structure(format!(
                        "'order' must list category names, found {}",
                        kind_of(&other)
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(ConfigError::Structure(format!(
                    "'order' must be a list, found {}",
                    kind_of(&other)
                )))
            }
        };

        for key in RESERVED_KEYS {
            root.remove(*key);
        }
        let legacy = take_legacy_format_keys(&mut root);

        let mut diagnostics = Vec::new();
        let mut categories = BTreeMap::new();

        for check in registry.iter() {
            let category = check.category();
            let mut section = match root.remove(category) {
                None | Some(Value::Null) => Map::new(),
                Some(Value::Object(section)) => section,
                Some(other) => {
                    let reason = format!("expected an object, found {}", kind_of(&other));
                    categories.insert(
                        category.to_string(),
                        misconfigured(category, None, reason, &mut diagnostics),
                    );
                    continue;
                }
            };

            if category == format::CATEGORY {
                for (key, value) in &legacy {
                    section.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }

            categories.insert(
                category.to_string(),
                category_config(check, section, &mut diagnostics),
            );
        }

        for key in root.keys() {
            if strict {
                diagnostics.push(unknown_category(key, "unknown configuration key"));
            } else {
                debug!(key = %key, "ignoring unknown configuration key");
            }
        }

        let mut order = Vec::new();
        for name in requested_order {
            if !registry.contains(&name) {
                if strict {
                    diagnostics.push(unknown_category(&name, "unknown category in 'order'"));
                } else {
                    warn!(category = %name, "ignoring unknown category in 'order'");
                }
            } else if !order.contains(&name) {
                order.push(name);
            }
        }

        Ok(Self {
            strict,
            order,
            categories,
            diagnostics,
        })
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Known categories in the requested order, without duplicates.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn category(&self, name: &str) -> Option<&CategoryConfig> {
        self.categories.get(name)
    }

    /// Categories absent from the configuration count as enabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.categories.get(name).map_or(true, |c| c.enabled)
    }

    /// Configuration findings, reported ahead of any check output.
    pub fn diagnostics(&self) -> &[Finding] {
        &self.diagnostics
    }

    /// Replace one category's rules, enabling it.
    pub fn set_rules(&mut self, category: &str, rules: CheckRules) {
        let entry = self
            .categories
            .entry(category.to_string())
            .or_insert_with(|| CategoryConfig::ready(rules.clone()));
        entry.enabled = true;
        entry.state = CategoryState::Ready(rules);
    }

    pub fn set_enabled(&mut self, category: &str, enabled: bool) {
        if let Some(entry) = self.categories.get_mut(category) {
            entry.enabled = enabled;
        }
    }

    pub fn set_order(&mut self, order: Vec<String>) {
        self.order = order;
    }
}

/// A rule document spelling out every default, as written by `gedlint init`.
pub fn default_document(registry: &CheckRegistry) -> serde_json::Result<Value> {
    let mut root = Map::new();
    root.insert("strict".to_string(), Value::Bool(false));
    root.insert(
        "order".to_string(),
        Value::Array(
            registry
                .categories()
                .into_iter()
                .map(|c| Value::String(c.to_string()))
                .collect(),
        ),
    );

    for check in registry.iter() {
        let mut section = Map::new();
        section.insert("enabled".to_string(), Value::Bool(true));
        if let Value::Object(params) = check.default_rules().to_value()? {
            section.extend(params);
        }
        root.insert(check.category().to_string(), Value::Object(section));
    }

    Ok(Value::Object(root))
}

impl Default for RuleConfiguration {
    fn default() -> Self {
        Self::defaults()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Remove flat-layout keys from the root and map them to `format` keys.
fn take_legacy_format_keys(root: &mut Map<String, Value>) -> Vec<(String, Value)> {
    let mut legacy = Vec::new();

    for (old, new) in LEGACY_FORMAT_KEYS {
        if let Some(value) = root.remove(*old) {
            legacy.push((new.to_string(), value));
        }
    }

    if let Some(rules) = root.remove("name_validation_rules") {
        match rules.get("enforce_surname_slashes") {
            Some(value) => legacy.push(("require_surname_slashes".to_string(), value.clone())),
            None => debug!("name_validation_rules has no enforce_surname_slashes"),
        }
    }

    legacy
}

fn invalid_config(category: &str, field: Option<&str>, reason: &str) -> Finding {
    Finding::new(
        Severity::Error,
        category,
        "invalid-config",
        Location::config(category, field.map(str::to_string)),
        format!("Invalid {} configuration: {}", category, reason),
    )
    .with_suggestion(format!(
        "Fix the '{}' section; the category is skipped until then",
        category
    ))
}

fn unknown_category(name: &str, what: &str) -> Finding {
    Finding::new(
        Severity::Error,
        CONFIG_CATEGORY,
        "unknown-category",
        Location::config(name, None),
        format!("{} '{}'", what, name),
    )
    .with_value(name)
}

fn misconfigured(
    category: &str,
    field: Option<&str>,
    reason: String,
    diagnostics: &mut Vec<Finding>,
) -> CategoryConfig {
    warn!(category, reason = %reason, "category misconfigured");
    diagnostics.push(invalid_config(category, field, &reason));
    CategoryConfig {
        enabled: true,
        severity: None,
        state: CategoryState::Misconfigured(reason),
    }
}

fn category_config(
    check: &dyn Check,
    mut section: Map<String, Value>,
    diagnostics: &mut Vec<Finding>,
) -> CategoryConfig {
    let category = check.category();

    let enabled = match section.remove("enabled") {
        None => true,
        Some(Value::Bool(enabled)) => enabled,
        Some(other) => {
            let reason = format!("'enabled' must be a boolean, found {}", kind_of(&other));
            return misconfigured(category, Some("enabled"), reason, diagnostics);
        }
    };
    if !enabled {
        debug!(category, "category disabled");
        return CategoryConfig {
            enabled: false,
            severity: None,
            state: CategoryState::Ready(check.default_rules()),
        };
    }

    let severity = match section.remove("severity") {
        None => None,
        Some(value) => match serde_json::from_value::<SeverityOverride>(value) {
            Ok(severity) => Some(severity),
            Err(_) => {
                let reason =
                    "'severity' must be a severity or a map of finding code to severity"
                        .to_string();
                return misconfigured(category, Some("severity"), reason, diagnostics);
            }
        },
    };
    if let Some(severity) = &severity {
        let unknown: Vec<&str> = severity
            .codes()
            .into_iter()
            .filter(|code| !check.codes().iter().any(|info| info.code == *code))
            .collect();
        if !unknown.is_empty() {
            let reason = format!("unknown finding code(s) in 'severity': {}", unknown.join(", "));
            return misconfigured(category, Some("severity"), reason, diagnostics);
        }
    }

    match check.parse_rules(Value::Object(section)) {
        Ok(rules) => CategoryConfig {
            enabled: true,
            severity,
            state: CategoryState::Ready(rules),
        },
        Err(reason) => misconfigured(category, None, reason, diagnostics),
    }
}
