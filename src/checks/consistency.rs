//! Logical date constraints within and between related records.
//!
//! Dates are compared through their calendar bounds. A violation is only
//! reported when it holds for every reading of the dates involved, so partial
//! and qualified dates never produce false positives. Qualified dates are
//! still compared: `ABT 1850` against `1820` is a definite contradiction.

use chrono::{Days, NaiveDate};

use super::{default_severity, Check, CheckError, CodeInfo};
use crate::config::rules::{parse_rules, CheckRules, ConsistencyRules};
use crate::findings::{Finding, Location, Severity};
use crate::model::{DateValue, Event, Family, Individual, RecordSource};

pub const CATEGORY: &str = "consistency";

const CODES: &[CodeInfo] = &[
    CodeInfo {
        code: "death-before-birth",
        severity: Severity::Error,
        summary: "death date precedes birth date",
    },
    CodeInfo {
        code: "implausible-lifespan",
        severity: Severity::Warning,
        summary: "lifespan exceeds max_lifespan",
    },
    CodeInfo {
        code: "marriage-before-birth",
        severity: Severity::Error,
        summary: "marriage precedes a spouse's birth",
    },
    CodeInfo {
        code: "marriage-below-min-age",
        severity: Severity::Warning,
        summary: "a spouse is younger than min_marriage_age at marriage",
    },
    CodeInfo {
        code: "marriage-after-death",
        severity: Severity::Error,
        summary: "marriage follows a spouse's death",
    },
    CodeInfo {
        code: "child-before-marriage",
        severity: Severity::Warning,
        summary: "child born before the parents' marriage, beyond tolerance",
    },
    CodeInfo {
        code: "child-after-parent-death",
        severity: Severity::Error,
        summary: "child born after a parent's death, beyond tolerance",
    },
    CodeInfo {
        code: "child-before-parent-birth",
        severity: Severity::Error,
        summary: "child born before a parent",
    },
    CodeInfo {
        code: "implausible-parent-age",
        severity: Severity::Warning,
        summary: "parent implausibly young or old at the child's birth",
    },
];

pub struct ConsistencyCheck;

impl Check for ConsistencyCheck {
    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn codes(&self) -> &'static [CodeInfo] {
        CODES
    }

    fn default_rules(&self) -> CheckRules {
        CheckRules::Consistency(ConsistencyRules::default())
    }

    fn parse_rules(&self, value: serde_json::Value) -> Result<CheckRules, String> {
        parse_rules(value).map(CheckRules::Consistency)
    }

    fn check(
        &self,
        records: &dyn RecordSource,
        rules: &CheckRules,
    ) -> Result<Vec<Finding>, CheckError> {
        let CheckRules::Consistency(rules) = rules else {
            return Err(CheckError::RulesMismatch { check: CATEGORY });
        };

        let tolerance = Days::new(
            u64::from(rules.tolerance_years) * 365 + u64::from(rules.tolerance_days),
        );
        let mut findings = Vec::new();

        for individual in records.individuals() {
            check_lifespan(individual, rules, &mut findings);
        }

        for family in records.families() {
            let spouses: Vec<(Parent, &Individual)> = [
                (Parent::Father, family.husband.as_deref()),
                (Parent::Mother, family.wife.as_deref()),
            ]
            .into_iter()
            .filter_map(|(role, id)| id.and_then(|id| records.individual(id)).map(|i| (role, i)))
            .collect();

            let marriage = family.marriage();
            if let Some(marriage_date) = date_of(marriage) {
                for (_, spouse) in &spouses {
                    check_marriage(family, marriage_date, marriage, spouse, rules, &mut findings);
                }
            }

            for child_id in &family.children {
                let Some(child) = records.individual(child_id) else {
                    continue;
                };
                let Some(child_birth) = date_of(child.birth()) else {
                    continue;
                };

                if let Some(marriage_date) = date_of(marriage) {
                    if definitely_before(child_birth, marriage_date, tolerance) {
                        findings.push(
                            finding(
                                "child-before-marriage",
                                Location::individual_field(&child.id, "birth date"),
                                format!(
                                    "Born {} but parents in family {} married {}",
                                    raw_date(child.birth()),
                                    family.id,
                                    raw_date(marriage)
                                ),
                            )
                            .with_value(raw_date(child.birth())),
                        );
                    }
                }

                for (role, parent) in &spouses {
                    check_parent(
                        family,
                        child,
                        child_birth,
                        *role,
                        parent,
                        rules,
                        tolerance,
                        &mut findings,
                    );
                }
            }
        }

        Ok(findings)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parent {
    Father,
    Mother,
}

impl Parent {
    fn label(&self) -> &'static str {
        match self {
            Parent::Father => "father",
            Parent::Mother => "mother",
        }
    }
}

fn finding(code: &str, location: Location, message: String) -> Finding {
    Finding::new(default_severity(CODES, code), CATEGORY, code, location, message)
}

fn date_of(event: Option<&Event>) -> Option<&DateValue> {
    event.and_then(Event::parsed_date)
}

fn raw_date(event: Option<&Event>) -> &str {
    event
        .and_then(|e| e.date.as_ref())
        .map(|d| d.raw.as_str())
        .unwrap_or("")
}

/// `a` ends more than `slack` before `b` begins, for every reading.
fn definitely_before(a: &DateValue, b: &DateValue, slack: Days) -> bool {
    match (a.latest(), b.earliest()) {
        (Some(a_latest), Some(b_earliest)) => a_latest
            .checked_add_days(slack)
            .is_some_and(|shifted| shifted < b_earliest),
        _ => false,
    }
}

/// Whole years from `from` to `to`; `None` when `to` precedes `from`.
fn years_between(from: NaiveDate, to: NaiveDate) -> Option<u32> {
    to.years_since(from)
}

/// Age range `(youngest, oldest)` someone born `birth` can have at `at`.
fn age_range(birth: &DateValue, at: &DateValue) -> (Option<u32>, Option<u32>) {
    let youngest = match (birth.latest(), at.earliest()) {
        (Some(b), Some(a)) => years_between(b, a),
        _ => None,
    };
    let oldest = match (birth.earliest(), at.latest()) {
        (Some(b), Some(a)) => years_between(b, a),
        _ => None,
    };
    (youngest, oldest)
}

fn check_lifespan(individual: &Individual, rules: &ConsistencyRules, findings: &mut Vec<Finding>) {
    let (Some(birth), Some(death)) = (date_of(individual.birth()), date_of(individual.death()))
    else {
        return;
    };

    if definitely_before(death, birth, Days::new(0)) {
        findings.push(
            finding(
                "death-before-birth",
                Location::individual_field(&individual.id, "death date"),
                format!(
                    "{} died {} before being born {}",
                    individual.display_name(),
                    raw_date(individual.death()),
                    raw_date(individual.birth())
                ),
            )
            .with_value(raw_date(individual.death())),
        );
        return;
    }

    if let (Some(youngest), _) = age_range(birth, death) {
        if youngest > rules.max_lifespan {
            findings.push(finding(
                "implausible-lifespan",
                Location::individual_field(&individual.id, "death date"),
                format!(
                    "{} lived at least {} years (max {})",
                    individual.display_name(),
                    youngest,
                    rules.max_lifespan
                ),
            ));
        }
    }
}

fn check_marriage(
    family: &Family,
    marriage_date: &DateValue,
    marriage: Option<&Event>,
    spouse: &Individual,
    rules: &ConsistencyRules,
    findings: &mut Vec<Finding>,
) {
    let location = || Location::family_field(&family.id, "marriage date");

    if let Some(birth) = date_of(spouse.birth()) {
        if definitely_before(marriage_date, birth, Days::new(0)) {
            findings.push(
                finding(
                    "marriage-before-birth",
                    location(),
                    format!(
                        "Married {} before spouse {} was born {}",
                        raw_date(marriage),
                        spouse.display_name(),
                        raw_date(spouse.birth())
                    ),
                )
                .with_value(raw_date(marriage)),
            );
        } else if let (_, Some(oldest)) = age_range(birth, marriage_date) {
            if oldest < rules.min_marriage_age {
                findings.push(
                    finding(
                        "marriage-below-min-age",
                        location(),
                        format!(
                            "Spouse {} was at most {} at marriage {} (min {})",
                            spouse.display_name(),
                            oldest,
                            raw_date(marriage),
                            rules.min_marriage_age
                        ),
                    )
                    .with_value(raw_date(marriage)),
                );
            }
        }
    }

    if let Some(death) = date_of(spouse.death()) {
        if definitely_before(death, marriage_date, Days::new(0)) {
            findings.push(
                finding(
                    "marriage-after-death",
                    location(),
                    format!(
                        "Married {} after spouse {} died {}",
                        raw_date(marriage),
                        spouse.display_name(),
                        raw_date(spouse.death())
                    ),
                )
                .with_value(raw_date(marriage)),
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn check_parent(
    family: &Family,
    child: &Individual,
    child_birth: &DateValue,
    role: Parent,
    parent: &Individual,
    rules: &ConsistencyRules,
    tolerance: Days,
    findings: &mut Vec<Finding>,
) {
    let location = || Location::individual_field(&child.id, "birth date");

    if let Some(parent_birth) = date_of(parent.birth()) {
        if definitely_before(child_birth, parent_birth, Days::new(0)) {
            findings.push(
                finding(
                    "child-before-parent-birth",
                    location(),
                    format!(
                        "Born {} before {} {} was born {}",
                        raw_date(child.birth()),
                        role.label(),
                        parent.display_name(),
                        raw_date(parent.birth())
                    ),
                )
                .with_value(raw_date(child.birth())),
            );
        } else {
            let max_age = match role {
                Parent::Father => rules.max_father_age,
                Parent::Mother => rules.max_mother_age,
            };
            let (youngest, oldest) = age_range(parent_birth, child_birth);
            let problem = match (youngest, oldest) {
                (_, Some(oldest)) if oldest < rules.min_parent_age => {
                    Some(format!("at most {} (min {})", oldest, rules.min_parent_age))
                }
                (Some(youngest), _) if youngest > max_age => {
                    Some(format!("at least {} (max {})", youngest, max_age))
                }
                _ => None,
            };
            if let Some(problem) = problem {
                findings.push(finding(
                    "implausible-parent-age",
                    location(),
                    format!(
                        "{} {} in family {} was {} at this birth",
                        role.label(),
                        parent.display_name(),
                        family.id,
                        problem
                    ),
                ));
            }
        }
    }

    if let Some(parent_death) = date_of(parent.death()) {
        if definitely_before(parent_death, child_birth, tolerance) {
            findings.push(
                finding(
                    "child-after-parent-death",
                    location(),
                    format!(
                        "Born {} after {} {} died {}",
                        raw_date(child.birth()),
                        role.label(),
                        parent.display_name(),
                        raw_date(parent.death())
                    ),
                )
                .with_value(raw_date(child.birth())),
            );
        }
    }
}
