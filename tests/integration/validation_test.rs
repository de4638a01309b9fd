//! End-to-end validation runs over loaded and hand-built record sets

use gedlint::config::RuleConfiguration;
use gedlint::engine::ValidationEngine;
use gedlint::findings::{GroupBy, Location, Severity};
use gedlint::gedcom;

use crate::common::{codes, count_at};
use crate::support::builders::{FamilyBuilder, IndividualBuilder, TreeBuilder};
use crate::support::fixtures;

#[test]
fn test_clean_tree_has_no_findings() {
    let records = gedcom::parse_str(fixtures::CLEAN_TREE).unwrap();
    let findings = ValidationEngine::new().run(&records, &RuleConfiguration::defaults());
    assert!(findings.is_empty(), "unexpected findings: {:?}", codes(&findings));
}

#[test]
fn test_problem_tree_findings_in_category_order() {
    let records = gedcom::parse_str(fixtures::PROBLEM_TREE).unwrap();
    let findings = ValidationEngine::new().run(&records, &RuleConfiguration::defaults());

    assert_eq!(
        codes(&findings),
        vec![
            "missing-field",
            "death-before-birth",
            "dangling-reference",
            "dangling-reference",
            "imprecise-date",
        ]
    );
}

#[test]
fn test_approximate_birth_still_checked_against_death() {
    let records = gedcom::parse_str(fixtures::PROBLEM_TREE).unwrap();
    let findings = ValidationEngine::new().run(&records, &RuleConfiguration::defaults());

    let imprecise: Vec<_> = findings.with_code("imprecise-date").collect();
    assert_eq!(imprecise.len(), 1);
    assert_eq!(imprecise[0].severity, Severity::Info);
    assert_eq!(
        imprecise[0].location,
        Location::individual_field("I1", "birth date")
    );

    let conflict: Vec<_> = findings.with_code("death-before-birth").collect();
    assert_eq!(conflict.len(), 1);
    assert_eq!(conflict[0].severity, Severity::Error);
    assert_eq!(conflict[0].location.record_id(), Some("I1"));
}

#[test]
fn test_missing_birth_date_is_one_finding() {
    let records = gedcom::parse_str(fixtures::PROBLEM_TREE).unwrap();
    let findings = ValidationEngine::new().run(&records, &RuleConfiguration::defaults());

    let missing: Vec<_> = findings
        .with_code("missing-field")
        .filter(|f| f.location.record_id() == Some("I2"))
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].category, "completeness");
    assert_eq!(missing[0].location.field(), Some("birth date"));
}

#[test]
fn test_each_dangling_reference_reported() {
    let records = TreeBuilder::new()
        .with_individual(IndividualBuilder::new("I1").spouse_in("F1"))
        .with_family(
            FamilyBuilder::new("F1")
                .with_husband("I1")
                .with_wife("I404")
                .with_child("I405")
                .with_child("I406")
                .with_child("I405"),
        )
        .build();

    let findings = ValidationEngine::new().run(&records, &RuleConfiguration::defaults());
    let dangling: Vec<_> = findings.with_code("dangling-reference").collect();

    assert_eq!(dangling.len(), 4);
    let values: Vec<_> = dangling.iter().filter_map(|f| f.value.as_deref()).collect();
    assert_eq!(values, vec!["I404", "I405", "I406", "I405"]);
    assert!(dangling.iter().all(|f| f.location.record_id() == Some("F1")));
}

#[test]
fn test_three_person_cycle_reported_once() {
    let records = TreeBuilder::new()
        .with_ancestry_chain(&["A", "B", "C"], true)
        .build();

    let findings = ValidationEngine::new().run(&records, &RuleConfiguration::defaults());
    let cycles: Vec<_> = findings.with_code("ancestry-cycle").collect();

    assert_eq!(cycles.len(), 1);
    assert_eq!(
        cycles[0].location,
        Location::path(vec![
            "A".to_string(),
            "B".to_string(),
            "C".to_string(),
            "A".to_string()
        ])
    );
    assert_eq!(findings.with_code("asymmetric-link").count(), 0);
}

#[test]
fn test_open_chain_has_no_cycle() {
    let records = TreeBuilder::new()
        .with_ancestry_chain(&["A", "B", "C", "D"], false)
        .build();

    let findings = ValidationEngine::new().run(&records, &RuleConfiguration::defaults());
    assert_eq!(findings.with_code("ancestry-cycle").count(), 0);
}

#[test]
fn test_runs_are_identical() {
    let records = gedcom::parse_str(fixtures::PROBLEM_TREE).unwrap();
    let config = RuleConfiguration::defaults();
    let engine = ValidationEngine::new();

    let first = serde_json::to_string(&engine.run(&records, &config)).unwrap();
    let second = serde_json::to_string(&engine.run(&records, &config)).unwrap();
    assert_eq!(first, second);

    let parallel = ValidationEngine::new().with_parallel(true);
    let third = serde_json::to_string(&parallel.run(&records, &config)).unwrap();
    assert_eq!(first, third);
}

#[test]
fn test_disabled_category_emits_nothing() {
    let records = gedcom::parse_str(fixtures::PROBLEM_TREE).unwrap();
    let engine = ValidationEngine::new();

    for category in engine.registry().categories() {
        let mut config = RuleConfiguration::defaults();
        config.set_enabled(category, false);
        let findings = engine.run(&records, &config);
        assert!(
            findings.iter().all(|f| f.category != category),
            "{} still reported",
            category
        );
    }
}

#[test]
fn test_consistency_over_built_family() {
    let records = TreeBuilder::new()
        .with_individual(
            IndividualBuilder::new("I1")
                .with_name("Walter /Price/")
                .with_sex("M")
                .born("1800")
                .died("1840")
                .spouse_in("F1"),
        )
        .with_individual(
            IndividualBuilder::new("I2")
                .with_name("Edith /Hale/")
                .with_sex("F")
                .born("1805")
                .spouse_in("F1"),
        )
        .with_individual(
            IndividualBuilder::new("I3")
                .with_name("Alfred /Price/")
                .with_sex("M")
                .born("1850")
                .child_of("F1"),
        )
        .with_family(
            FamilyBuilder::new("F1")
                .with_husband("I1")
                .with_wife("I2")
                .with_child("I3")
                .married("1825"),
        )
        .build();

    let findings = ValidationEngine::new().run(&records, &RuleConfiguration::defaults());
    assert_eq!(count_at(&findings, "child-after-parent-death", "I3"), 1);
    // Mother is 44 or 45 at the birth, inside the default range.
    assert_eq!(findings.with_code("implausible-parent-age").count(), 0);
}

#[test]
fn test_findings_group_and_sort() {
    let records = gedcom::parse_str(fixtures::PROBLEM_TREE).unwrap();
    let findings = ValidationEngine::new().run(&records, &RuleConfiguration::defaults());

    let by_severity = findings.group_by(GroupBy::Severity);
    let labels: Vec<_> = by_severity.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(labels, vec!["error", "warning", "info"]);

    let sorted = findings.sorted();
    assert_eq!(sorted.len(), findings.len());
    let ids: Vec<_> = sorted.iter().map(|f| f.location.record_id()).collect();
    assert_eq!(
        ids,
        vec![Some("I1"), Some("I1"), Some("I2"), Some("F1"), Some("F1")]
    );
}
