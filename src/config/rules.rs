//! Typed rule structs, one per check category.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::findings::{Finding, Severity};
use crate::model::DatePolicy;

/// Parameters of one check category, after validation.
///
/// A closed set: adding a category means adding a variant here and a
/// [`crate::checks::Check`] implementation registered in the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckRules {
    Format(FormatRules),
    Completeness(CompletenessRules),
    Consistency(ConsistencyRules),
    CrossReference(CrossReferenceRules),
}

impl CheckRules {
    /// Parameters as a rule-document section.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            CheckRules::Format(rules) => serde_json::to_value(rules),
            CheckRules::Completeness(rules) => serde_json::to_value(rules),
            CheckRules::Consistency(rules) => serde_json::to_value(rules),
            CheckRules::CrossReference(rules) => serde_json::to_value(rules),
        }
    }
}

/// Rule structs validate their own parameters after deserialization.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Deserialize and validate one category's parameters.
pub fn parse_rules<T>(value: serde_json::Value) -> Result<T, String>
where
    T: DeserializeOwned + Validate,
{
    let rules: T = serde_json::from_value(value).map_err(|e| e.to_string())?;
    rules.validate()?;
    Ok(rules)
}

/// Severity override for a category: one severity for every finding, or a
/// per-code map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SeverityOverride {
    All(Severity),
    PerCode(BTreeMap<String, Severity>),
}

impl SeverityOverride {
    pub fn apply(&self, finding: &mut Finding) {
        match self {
            SeverityOverride::All(severity) => finding.severity = *severity,
            SeverityOverride::PerCode(map) => {
                if let Some(severity) = map.get(&finding.code) {
                    finding.severity = *severity;
                }
            }
        }
    }

    /// Codes named in a per-code override.
    pub fn codes(&self) -> Vec<&str> {
        match self {
            SeverityOverride::All(_) => Vec::new(),
            SeverityOverride::PerCode(map) => map.keys().map(String::as_str).collect(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_date_formats() -> Vec<String> {
    vec!["%d %b %Y".to_string(), "%b %Y".to_string(), "%Y".to_string()]
}

/// Field syntax rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FormatRules {
    /// chrono strftime patterns accepted for event dates.
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
    /// Accept the native GEDCOM date grammar in addition to `date_formats`.
    #[serde(default = "default_true")]
    pub allow_native_dates: bool,
    /// Emit `imprecise-date` for qualified, ranged or phrase dates.
    #[serde(default = "default_true")]
    pub report_imprecise: bool,
    /// Regex every name must match, e.g. `^[A-Z]`.
    #[serde(default)]
    pub name_pattern: Option<String>,
    #[serde(default = "default_true")]
    pub require_surname_slashes: bool,
    /// Accepted place hierarchies such as `City, Region, Country`. Only the
    /// number of comma-separated parts is compared. Empty accepts any place.
    #[serde(default)]
    pub place_structures: Vec<String>,
}

impl Default for FormatRules {
    fn default() -> Self {
        Self {
            date_formats: default_date_formats(),
            allow_native_dates: true,
            report_imprecise: true,
            name_pattern: None,
            require_surname_slashes: true,
            place_structures: Vec::new(),
        }
    }
}

impl FormatRules {
    pub fn date_policy(&self) -> DatePolicy {
        DatePolicy {
            formats: self.date_formats.clone(),
            allow_native: self.allow_native_dates,
        }
    }

    /// Part counts of the accepted place structures, deduplicated and sorted.
    pub fn place_part_counts(&self) -> Vec<usize> {
        let mut counts: Vec<usize> = self
            .place_structures
            .iter()
            .map(|s| s.split(',').count())
            .collect();
        counts.sort_unstable();
        counts.dedup();
        counts
    }
}

impl Validate for FormatRules {
    fn validate(&self) -> Result<(), String> {
        if self.date_formats.is_empty() && !self.allow_native_dates {
            return Err(
                "date_formats is empty and allow_native_dates is false; no date could be valid"
                    .to_string(),
            );
        }
        for format in &self.date_formats {
            DatePolicy::validate_format(format).map_err(|e| format!("date_formats: {}", e))?;
        }
        if let Some(pattern) = &self.name_pattern {
            Regex::new(pattern).map_err(|e| format!("name_pattern: {}", e))?;
        }
        if self.place_structures.iter().any(|s| s.trim().is_empty()) {
            return Err("place_structures: entries must not be empty".to_string());
        }
        Ok(())
    }
}

/// Individual fields that can be required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum IndividualField {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "given name")]
    GivenName,
    #[serde(rename = "surname")]
    Surname,
    #[serde(rename = "sex")]
    Sex,
    #[serde(rename = "birth date")]
    BirthDate,
    #[serde(rename = "birth place")]
    BirthPlace,
    #[serde(rename = "death date")]
    DeathDate,
    #[serde(rename = "death place")]
    DeathPlace,
}

impl IndividualField {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndividualField::Name => "name",
            IndividualField::GivenName => "given name",
            IndividualField::Surname => "surname",
            IndividualField::Sex => "sex",
            IndividualField::BirthDate => "birth date",
            IndividualField::BirthPlace => "birth place",
            IndividualField::DeathDate => "death date",
            IndividualField::DeathPlace => "death place",
        }
    }
}

impl fmt::Display for IndividualField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Family fields that can be required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum FamilyField {
    #[serde(rename = "husband")]
    Husband,
    #[serde(rename = "wife")]
    Wife,
    #[serde(rename = "children")]
    Children,
    #[serde(rename = "marriage date")]
    MarriageDate,
    #[serde(rename = "marriage place")]
    MarriagePlace,
}

impl FamilyField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyField::Husband => "husband",
            FamilyField::Wife => "wife",
            FamilyField::Children => "children",
            FamilyField::MarriageDate => "marriage date",
            FamilyField::MarriagePlace => "marriage place",
        }
    }
}

impl fmt::Display for FamilyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_individual_fields() -> Vec<IndividualField> {
    vec![
        IndividualField::Name,
        IndividualField::Sex,
        IndividualField::BirthDate,
    ]
}

fn default_family_fields() -> Vec<FamilyField> {
    vec![FamilyField::MarriageDate]
}

/// Required fields per entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompletenessRules {
    #[serde(default = "default_individual_fields")]
    pub individual: Vec<IndividualField>,
    #[serde(default = "default_family_fields")]
    pub family: Vec<FamilyField>,
}

impl Default for CompletenessRules {
    fn default() -> Self {
        Self {
            individual: default_individual_fields(),
            family: default_family_fields(),
        }
    }
}

impl Validate for CompletenessRules {
    fn validate(&self) -> Result<(), String> {
        for (idx, field) in self.individual.iter().enumerate() {
            if self.individual[..idx].contains(field) {
                return Err(format!("individual: '{}' is listed twice", field));
            }
        }
        for (idx, field) in self.family.iter().enumerate() {
            if self.family[..idx].contains(field) {
                return Err(format!("family: '{}' is listed twice", field));
            }
        }
        Ok(())
    }
}

fn default_min_marriage_age() -> u32 {
    14
}

fn default_tolerance_days() -> u32 {
    280
}

fn default_min_parent_age() -> u32 {
    14
}

fn default_max_father_age() -> u32 {
    80
}

fn default_max_mother_age() -> u32 {
    55
}

fn default_max_lifespan() -> u32 {
    120
}

/// Thresholds for logical date constraints. Ages are in whole years.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConsistencyRules {
    #[serde(default = "default_min_marriage_age")]
    pub min_marriage_age: u32,
    /// Slack applied to child-vs-marriage and child-vs-parent-death checks.
    #[serde(default)]
    pub tolerance_years: u32,
    #[serde(default = "default_tolerance_days")]
    pub tolerance_days: u32,
    #[serde(default = "default_min_parent_age")]
    pub min_parent_age: u32,
    #[serde(default = "default_max_father_age")]
    pub max_father_age: u32,
    #[serde(default = "default_max_mother_age")]
    pub max_mother_age: u32,
    #[serde(default = "default_max_lifespan")]
    pub max_lifespan: u32,
}

impl Default for ConsistencyRules {
    fn default() -> Self {
        Self {
            min_marriage_age: default_min_marriage_age(),
            tolerance_years: 0,
            tolerance_days: default_tolerance_days(),
            min_parent_age: default_min_parent_age(),
            max_father_age: default_max_father_age(),
            max_mother_age: default_max_mother_age(),
            max_lifespan: default_max_lifespan(),
        }
    }
}

impl Validate for ConsistencyRules {
    fn validate(&self) -> Result<(), String> {
        if self.max_lifespan == 0 {
            return Err("max_lifespan must be greater than 0".to_string());
        }
        if self.min_parent_age > self.max_father_age || self.min_parent_age > self.max_mother_age
        {
            return Err(format!(
                "min_parent_age ({}) exceeds max_father_age ({}) or max_mother_age ({})",
                self.min_parent_age, self.max_father_age, self.max_mother_age
            ));
        }
        if self.tolerance_years > 100 {
            return Err(format!(
                "tolerance_years must be at most 100, got {}",
                self.tolerance_years
            ));
        }
        Ok(())
    }
}

/// Reference integrity switches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CrossReferenceRules {
    /// Compare individual family links with family member lists.
    #[serde(default = "default_true")]
    pub check_symmetry: bool,
    #[serde(default = "default_true")]
    pub detect_cycles: bool,
}

impl Default for CrossReferenceRules {
    fn default() -> Self {
        Self {
            check_symmetry: true,
            detect_cycles: true,
        }
    }
}

impl Validate for CrossReferenceRules {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}
