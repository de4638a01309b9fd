//! Required-field checks.
//!
//! Emits one `missing-field` finding per absent field so reports can be
//! filtered and counted field by field.

use super::{default_severity, Check, CheckError, CodeInfo};
use crate::config::rules::{parse_rules, CheckRules, CompletenessRules, FamilyField, IndividualField};
use crate::findings::{Finding, Location, Severity};
use crate::model::{Event, Family, Individual, RecordSource};

pub const CATEGORY: &str = "completeness";

const CODES: &[CodeInfo] = &[CodeInfo {
    code: "missing-field",
    severity: Severity::Warning,
    summary: "a required field is absent",
}];

pub struct CompletenessCheck;

impl Check for CompletenessCheck {
    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn codes(&self) -> &'static [CodeInfo] {
        CODES
    }

    fn default_rules(&self) -> CheckRules {
        CheckRules::Completeness(CompletenessRules::default())
    }

    fn parse_rules(&self, value: serde_json::Value) -> Result<CheckRules, String> {
        parse_rules(value).map(CheckRules::Completeness)
    }

    fn check(
        &self,
        records: &dyn RecordSource,
        rules: &CheckRules,
    ) -> Result<Vec<Finding>, CheckError> {
        let CheckRules::Completeness(rules) = rules else {
            return Err(CheckError::RulesMismatch { check: CATEGORY });
        };

        let mut findings = Vec::new();

        for individual in records.individuals() {
            for field in &rules.individual {
                if !individual_has(individual, *field) {
                    findings.push(missing(
                        Location::individual_field(&individual.id, field.as_str()),
                        field.as_str(),
                        "individual",
                    ));
                }
            }
        }

        for family in records.families() {
            for field in &rules.family {
                if !family_has(family, *field) {
                    findings.push(missing(
                        Location::family_field(&family.id, field.as_str()),
                        field.as_str(),
                        "family",
                    ));
                }
            }
        }

        Ok(findings)
    }
}

fn missing(location: Location, field: &str, kind: &str) -> Finding {
    Finding::new(
        default_severity(CODES, "missing-field"),
        CATEGORY,
        "missing-field",
        location,
        format!("Missing required {} field '{}'", kind, field),
    )
}

fn has_date(event: Option<&Event>) -> bool {
    event.is_some_and(|e| e.date.is_some())
}

fn has_place(event: Option<&Event>) -> bool {
    event.is_some_and(|e| e.place.is_some())
}

fn individual_has(individual: &Individual, field: IndividualField) -> bool {
    match field {
        IndividualField::Name => individual.name.is_some(),
        IndividualField::GivenName => individual
            .name
            .as_ref()
            .is_some_and(|n| n.given.is_some()),
        IndividualField::Surname => individual
            .name
            .as_ref()
            .and_then(|n| n.surname.as_deref())
            .is_some_and(|s| !s.is_empty()),
        IndividualField::Sex => individual.sex.is_some(),
        IndividualField::BirthDate => has_date(individual.birth()),
        IndividualField::BirthPlace => has_place(individual.birth()),
        IndividualField::DeathDate => has_date(individual.death()),
        IndividualField::DeathPlace => has_place(individual.death()),
    }
}

fn family_has(family: &Family, field: FamilyField) -> bool {
    match field {
        FamilyField::Husband => family.husband.is_some(),
        FamilyField::Wife => family.wife.is_some(),
        FamilyField::Children => !family.children.is_empty(),
        FamilyField::MarriageDate => has_date(family.marriage()),
        FamilyField::MarriagePlace => has_place(family.marriage()),
    }
}
