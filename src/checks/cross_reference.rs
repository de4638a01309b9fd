//! Reference integrity between individuals and families.
//!
//! Three passes, in order: family references (dangling and asymmetric),
//! individual back-references, then ancestry cycles.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{default_severity, Check, CheckError, CodeInfo};
use crate::config::rules::{parse_rules, CheckRules, CrossReferenceRules};
use crate::findings::{Finding, Location, Severity};
use crate::model::{FamilyRole, RecordSource};

pub const CATEGORY: &str = "cross_reference";

const CODES: &[CodeInfo] = &[
    CodeInfo {
        code: "dangling-reference",
        severity: Severity::Error,
        summary: "a reference points at a record that does not exist",
    },
    CodeInfo {
        code: "asymmetric-link",
        severity: Severity::Warning,
        summary: "family membership is recorded on one side only",
    },
    CodeInfo {
        code: "ancestry-cycle",
        severity: Severity::Error,
        summary: "an individual is their own ancestor",
    },
];

pub struct CrossReferenceCheck;

impl Check for CrossReferenceCheck {
    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn codes(&self) -> &'static [CodeInfo] {
        CODES
    }

    fn default_rules(&self) -> CheckRules {
        CheckRules::CrossReference(CrossReferenceRules::default())
    }

    fn parse_rules(&self, value: serde_json::Value) -> Result<CheckRules, String> {
        parse_rules(value).map(CheckRules::CrossReference)
    }

    fn check(
        &self,
        records: &dyn RecordSource,
        rules: &CheckRules,
    ) -> Result<Vec<Finding>, CheckError> {
        let CheckRules::CrossReference(rules) = rules else {
            return Err(CheckError::RulesMismatch { check: CATEGORY });
        };

        let mut findings = Vec::new();
        check_families(records, rules, &mut findings);
        check_individuals(records, rules, &mut findings);

        if rules.detect_cycles {
            let graph = ancestry_graph(records);
            for cycle in find_cycles(&graph) {
                let path: Vec<String> = cycle.iter().map(|id| id.to_string()).collect();
                let shown = path.join(" -> ");
                findings.push(finding(
                    "ancestry-cycle",
                    Location::path(path),
                    format!("{} is recorded as their own ancestor: {}", cycle[0], shown),
                ));
            }
        }

        Ok(findings)
    }
}

fn finding(code: &str, location: Location, message: String) -> Finding {
    Finding::new(default_severity(CODES, code), CATEGORY, code, location, message)
}

fn link_field(role: FamilyRole) -> &'static str {
    match role {
        FamilyRole::Child => "child family",
        FamilyRole::Spouse => "spouse family",
    }
}

fn check_families(
    records: &dyn RecordSource,
    rules: &CrossReferenceRules,
    findings: &mut Vec<Finding>,
) {
    for family in records.families() {
        let references = family
            .spouses()
            .map(|(field, id)| (field, FamilyRole::Spouse, id))
            .chain(
                family
                    .children
                    .iter()
                    .map(|id| ("children", FamilyRole::Child, id.as_str())),
            );

        for (field, role, id) in references {
            let Some(individual) = records.individual(id) else {
                findings.push(
                    finding(
                        "dangling-reference",
                        Location::family_field(&family.id, field),
                        format!(
                            "Family {} references unknown individual {} as {}",
                            family.id, id, field
                        ),
                    )
                    .with_value(id),
                );
                continue;
            };

            if rules.check_symmetry && !individual.families_as(role).any(|f| f == family.id) {
                findings.push(
                    finding(
                        "asymmetric-link",
                        Location::family_field(&family.id, field),
                        format!(
                            "Family {} lists {} as {} but the individual has no {} link back",
                            family.id,
                            id,
                            role,
                            link_field(role)
                        ),
                    )
                    .with_value(id)
                    .with_suggestion(format!(
                        "Add the {} link to {} or remove {} from the family",
                        link_field(role),
                        family.id,
                        id
                    )),
                );
            }
        }
    }
}

fn check_individuals(
    records: &dyn RecordSource,
    rules: &CrossReferenceRules,
    findings: &mut Vec<Finding>,
) {
    for individual in records.individuals() {
        for link in &individual.links {
            let field = link_field(link.role);
            let Some(family) = records.family(&link.family_id) else {
                findings.push(
                    finding(
                        "dangling-reference",
                        Location::individual_field(&individual.id, field),
                        format!(
                            "Individual {} references unknown family {}",
                            individual.id, link.family_id
                        ),
                    )
                    .with_value(link.family_id.as_str()),
                );
                continue;
            };

            let listed = family
                .members()
                .any(|(role, id)| role == link.role && id == individual.id);
            if rules.check_symmetry && !listed {
                findings.push(
                    finding(
                        "asymmetric-link",
                        Location::individual_field(&individual.id, field),
                        format!(
                            "{} links to family {} as {} but the family does not list them",
                            individual.id, family.id, link.role
                        ),
                    )
                    .with_value(link.family_id.as_str()),
                );
            }
        }
    }
}

/// Edges from each child to its resolvable parents.
fn ancestry_graph(records: &dyn RecordSource) -> BTreeMap<&str, Vec<&str>> {
    let mut graph: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for family in records.families() {
        let parents: Vec<&str> = family
            .spouses()
            .map(|(_, id)| id)
            .filter(|id| records.individual(id).is_some())
            .collect();
        if parents.is_empty() {
            continue;
        }

        for child in &family.children {
            if records.individual(child).is_none() {
                continue;
            }
            let edges = graph.entry(child.as_str()).or_default();
            for &parent in &parents {
                if !edges.contains(&parent) {
                    edges.push(parent);
                }
            }
        }
    }

    graph
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Iterative depth-first search over child -> parent edges.
///
/// Each cycle is returned once, rotated to start at its smallest id and
/// closed by repeating that id.
fn find_cycles<'a>(graph: &BTreeMap<&'a str, Vec<&'a str>>) -> Vec<Vec<&'a str>> {
    let mut state: HashMap<&'a str, Visit> = HashMap::new();
    let mut seen: BTreeSet<Vec<&'a str>> = BTreeSet::new();
    let mut cycles = Vec::new();

    for &start in graph.keys() {
        if state.contains_key(start) {
            continue;
        }
        state.insert(start, Visit::InProgress);
        let mut stack: Vec<(&'a str, usize)> = vec![(start, 0)];

        while let Some(&(node, next)) = stack.last() {
            let parents = graph.get(node).map(Vec::as_slice).unwrap_or(&[]);
            let Some(&parent) = parents.get(next) else {
                state.insert(node, Visit::Done);
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match state.get(parent).copied() {
                None => {
                    state.insert(parent, Visit::InProgress);
                    stack.push((parent, 0));
                }
                Some(Visit::InProgress) => {
                    let Some(pos) = stack.iter().position(|(id, _)| *id == parent) else {
                        continue;
                    };
                    let cycle = canonical(stack[pos..].iter().map(|(id, _)| *id).collect());
                    if seen.insert(cycle.clone()) {
                        let mut closed = cycle;
                        closed.push(closed[0]);
                        cycles.push(closed);
                    }
                }
                Some(Visit::Done) => {}
            }
        }
    }

    cycles
}

fn canonical(mut cycle: Vec<&str>) -> Vec<&str> {
    if let Some((min, _)) = cycle.iter().enumerate().min_by_key(|(_, id)| **id) {
        cycle.rotate_left(min);
    }
    cycle
}
