//! Rule files driving validation runs

use gedlint::config::{ConfigError, RuleConfiguration};
use gedlint::engine::ValidationEngine;
use gedlint::findings::{Severity, CONFIG_CATEGORY};
use gedlint::gedcom;

use crate::common::codes;
use crate::support::fixtures;
use crate::support::harness::TestHarness;

#[test]
fn test_yaml_rules_override_severity_and_disable() {
    let harness = TestHarness::new();
    let path = harness.write(
        "rules.yaml",
        r#"
format:
  severity:
    imprecise-date: warning
cross_reference:
  enabled: false
completeness:
  severity: info
"#,
    );

    let config = RuleConfiguration::load(&path).unwrap();
    let records = gedcom::parse_str(fixtures::PROBLEM_TREE).unwrap();
    let findings = ValidationEngine::new().run(&records, &config);

    assert_eq!(
        codes(&findings),
        vec!["missing-field", "death-before-birth", "imprecise-date"]
    );
    let severities: Vec<_> = findings.iter().map(|f| f.severity).collect();
    assert_eq!(
        severities,
        vec![Severity::Info, Severity::Error, Severity::Warning]
    );
}

#[test]
fn test_misconfigured_category_reported_before_other_findings() {
    let harness = TestHarness::new();
    let path = harness.write(
        "rules.json",
        r#"{ "consistency": { "max_lifespan": "forever" } }"#,
    );

    let config = RuleConfiguration::load(&path).unwrap();
    let records = gedcom::parse_str(fixtures::PROBLEM_TREE).unwrap();
    let findings = ValidationEngine::new().run(&records, &config);

    let first = &findings.as_slice()[0];
    assert_eq!(first.code, "invalid-config");
    assert_eq!(first.category, "consistency");
    assert_eq!(first.severity, Severity::Error);
    assert_eq!(findings.with_code("death-before-birth").count(), 0);
    // The other categories still ran.
    assert_eq!(findings.with_code("dangling-reference").count(), 2);
}

#[test]
fn test_strict_mode_flags_unknown_category() {
    let harness = TestHarness::new();
    let path = harness.write(
        "rules.json",
        r#"{ "strict": true, "source_citations": { "enabled": true } }"#,
    );

    let config = RuleConfiguration::load(&path).unwrap();
    let records = gedcom::parse_str(fixtures::CLEAN_TREE).unwrap();
    let findings = ValidationEngine::new().run(&records, &config);

    assert_eq!(codes(&findings), vec!["unknown-category"]);
    assert_eq!(findings.as_slice()[0].category, CONFIG_CATEGORY);
}

#[test]
fn test_configured_order_controls_output() {
    let harness = TestHarness::new();
    let path = harness.write(
        "rules.json",
        r#"{ "order": ["format", "cross_reference"] }"#,
    );

    let config = RuleConfiguration::load(&path).unwrap();
    let records = gedcom::parse_str(fixtures::PROBLEM_TREE).unwrap();
    let findings = ValidationEngine::new().run(&records, &config);

    assert_eq!(
        codes(&findings),
        vec![
            "imprecise-date",
            "dangling-reference",
            "dangling-reference",
            "missing-field",
            "death-before-birth",
        ]
    );
}

#[test]
fn test_unparseable_rules_file_is_fatal() {
    let harness = TestHarness::new();
    let path = harness.write("rules.yaml", "format: [unclosed");

    let err = RuleConfiguration::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_legacy_rules_file() {
    let harness = TestHarness::new();
    let path = harness.write(
        "legacy.json",
        r#"{
            "preferred_date_formats": ["%Y-%m-%d"],
            "name_validation_rules": { "enforce_surname_slashes": true }
        }"#,
    );

    let config = RuleConfiguration::load(&path).unwrap();
    assert!(config.diagnostics().is_empty());

    // Native GEDCOM dates remain accepted alongside the legacy format list.
    let records = gedcom::parse_str(fixtures::CLEAN_TREE).unwrap();
    let findings = ValidationEngine::new().run(&records, &config);
    assert!(findings.is_empty(), "unexpected findings: {:?}", codes(&findings));
}
