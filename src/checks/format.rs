//! Field syntax checks: dates, names, places and sex values.

use regex::Regex;

use super::{default_severity, Check, CheckError, CodeInfo};
use crate::config::rules::{parse_rules, CheckRules, FormatRules};
use crate::findings::{Finding, Location, Severity};
use crate::model::{DateError, DatePolicy, DateValue, Event, Individual, RecordSource};

pub const CATEGORY: &str = "format";

const CODES: &[CodeInfo] = &[
    CodeInfo {
        code: "invalid-date",
        severity: Severity::Error,
        summary: "date is impossible or matches no accepted format",
    },
    CodeInfo {
        code: "imprecise-date",
        severity: Severity::Info,
        summary: "date is qualified (about/before/after), a range or a phrase",
    },
    CodeInfo {
        code: "empty-name",
        severity: Severity::Error,
        summary: "name is present but blank",
    },
    CodeInfo {
        code: "missing-surname-slashes",
        severity: Severity::Warning,
        summary: "surname is not enclosed in slashes",
    },
    CodeInfo {
        code: "malformed-surname",
        severity: Severity::Warning,
        summary: "surname slashes enclose nothing",
    },
    CodeInfo {
        code: "name-pattern-mismatch",
        severity: Severity::Warning,
        summary: "name does not match the configured pattern",
    },
    CodeInfo {
        code: "empty-place",
        severity: Severity::Warning,
        summary: "place is present but blank",
    },
    CodeInfo {
        code: "place-structure",
        severity: Severity::Warning,
        summary: "place does not follow an accepted hierarchy",
    },
    CodeInfo {
        code: "invalid-sex",
        severity: Severity::Error,
        summary: "sex value is not M, F, U or X",
    },
];

pub struct FormatCheck;

impl Check for FormatCheck {
    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn codes(&self) -> &'static [CodeInfo] {
        CODES
    }

    fn default_rules(&self) -> CheckRules {
        CheckRules::Format(FormatRules::default())
    }

    fn parse_rules(&self, value: serde_json::Value) -> Result<CheckRules, String> {
        parse_rules(value).map(CheckRules::Format)
    }

    fn check(
        &self,
        records: &dyn RecordSource,
        rules: &CheckRules,
    ) -> Result<Vec<Finding>, CheckError> {
        let CheckRules::Format(rules) = rules else {
            return Err(CheckError::RulesMismatch { check: CATEGORY });
        };

        let validator = FieldValidator::new(rules)?;
        let mut findings = Vec::new();

        for individual in records.individuals() {
            validator.individual(individual, &mut findings);
        }
        for family in records.families() {
            for event in &family.events {
                validator.event(
                    event,
                    &|field: String| Location::family_field(&family.id, field),
                    &mut findings,
                );
            }
        }

        Ok(findings)
    }
}

/// Rule set with the name pattern compiled once per run.
struct FieldValidator<'a> {
    rules: &'a FormatRules,
    policy: DatePolicy,
    name_pattern: Option<Regex>,
    place_counts: Vec<usize>,
}

impl<'a> FieldValidator<'a> {
    fn new(rules: &'a FormatRules) -> Result<Self, CheckError> {
        let name_pattern = rules
            .name_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| CheckError::InvalidRule(format!("name_pattern: {}", e)))?;

        Ok(Self {
            rules,
            policy: rules.date_policy(),
            name_pattern,
            place_counts: rules.place_part_counts(),
        })
    }

    fn finding(&self, code: &str, location: Location, message: String) -> Finding {
        Finding::new(default_severity(CODES, code), CATEGORY, code, location, message)
    }

    fn individual(&self, individual: &Individual, findings: &mut Vec<Finding>) {
        let id = individual.id.as_str();

        if let Some(name) = &individual.name {
            let location = || Location::individual_field(id, "name");
            if name.is_blank() {
                findings.push(
                    self.finding("empty-name", location(), "Name is present but empty".to_string())
                        .with_value(&name.raw),
                );
            } else {
                if self.rules.require_surname_slashes {
                    match name.surname.as_deref() {
                        None => findings.push(
                            self.finding(
                                "missing-surname-slashes",
                                location(),
                                "Name does not use GEDCOM surname slashes".to_string(),
                            )
                            .with_value(&name.raw)
                            .with_suggestion("Enclose the surname in slashes, e.g. John /Smith/"),
                        ),
                        Some("") => findings.push(
                            self.finding(
                                "malformed-surname",
                                location(),
                                "Name has surname slashes but no surname between them"
                                    .to_string(),
                            )
                            .with_value(&name.raw)
                            .with_suggestion("Put the surname between the slashes or remove them"),
                        ),
                        Some(_) => {}
                    }
                }

                if let Some(pattern) = &self.name_pattern {
                    let subject = match name.surname.as_deref() {
                        Some(surname) if !surname.is_empty() => surname.to_string(),
                        _ => name.raw.replace('/', "").trim().to_string(),
                    };
                    if !pattern.is_match(&subject) {
                        findings.push(
                            self.finding(
                                "name-pattern-mismatch",
                                location(),
                                format!("'{}' does not match pattern {}", subject, pattern),
                            )
                            .with_value(&name.raw),
                        );
                    }
                }
            }
        }

        if let Some(sex) = &individual.sex {
            if individual.parsed_sex().is_none() {
                findings.push(
                    self.finding(
                        "invalid-sex",
                        Location::individual_field(id, "sex"),
                        format!("Sex value '{}' is not recognised", sex),
                    )
                    .with_value(sex)
                    .with_suggestion("Use M, F, U or X"),
                );
            }
        }

        for event in &individual.events {
            self.event(event, &|field: String| Location::individual_field(id, field), findings);
        }
    }

    fn event(
        &self,
        event: &Event,
        locate: &dyn Fn(String) -> Location,
        findings: &mut Vec<Finding>,
    ) {
        if let Some(date) = &event.date {
            let field = format!("{} date", event.kind);
            match DateValue::parse(&date.raw, &self.policy) {
                Ok(value) => {
                    if self.rules.report_imprecise && value.is_imprecise() {
                        let label = value.qualifier_label().unwrap_or("imprecise");
                        findings.push(
                            self.finding(
                                "imprecise-date",
                                locate(field),
                                format!("{} date '{}' is imprecise ({})", event.kind, date.raw, label),
                            )
                            .with_value(&date.raw),
                        );
                    }
                }
                Err(err) => {
                    let message = match &err {
                        DateError::Empty => format!("{} date is present but empty", event.kind),
                        DateError::Impossible(_) => {
                            format!("{} date '{}' is not a real calendar date", event.kind, date.raw)
                        }
                        DateError::Unrecognized(_) => format!(
                            "{} date '{}' matches no accepted format",
                            event.kind, date.raw
                        ),
                    };
                    findings.push(
                        self.finding("invalid-date", locate(field), message)
                            .with_value(&date.raw)
                            .with_suggestion(self.date_suggestion()),
                    );
                }
            }
        }

        if let Some(place) = &event.place {
            let field = format!("{} place", event.kind);
            let trimmed = place.trim();
            if trimmed.is_empty() {
                findings.push(
                    self.finding(
                        "empty-place",
                        locate(field),
                        format!("{} place is present but empty", event.kind),
                    )
                    .with_value(place),
                );
            } else if !self.place_counts.is_empty() {
                let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
                let has_empty_part = parts.iter().any(|p| p.is_empty());
                if has_empty_part || !self.place_counts.contains(&parts.len()) {
                    findings.push(
                        self.finding(
                            "place-structure",
                            locate(field),
                            format!(
                                "{} place '{}' does not match an accepted hierarchy",
                                event.kind, trimmed
                            ),
                        )
                        .with_value(place)
                        .with_suggestion(format!(
                            "Expected one of: {}",
                            self.rules.place_structures.join(" | ")
                        )),
                    );
                }
            }
        }
    }

    fn date_suggestion(&self) -> String {
        let mut accepted: Vec<&str> = self.rules.date_formats.iter().map(String::as_str).collect();
        if self.rules.allow_native_dates {
            accepted.push("GEDCOM dates (1 JAN 1900, ABT 1850, BET 1850 AND 1855)");
        }
        format!("Accepted formats: {}", accepted.join(", "))
    }
}
