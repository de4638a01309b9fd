//! Rendering engine output

use serial_test::serial;

use gedlint::config::RuleConfiguration;
use gedlint::engine::ValidationEngine;
use gedlint::findings::Findings;
use gedlint::gedcom;
use gedlint::report::{render_json, render_text, ReportContext};

use crate::support::fixtures;

fn problem_findings() -> Findings {
    let records = gedcom::parse_str(fixtures::PROBLEM_TREE).unwrap();
    ValidationEngine::new().run(&records, &RuleConfiguration::defaults())
}

#[test]
fn test_text_report_sections_follow_check_order() {
    let text = render_text(&problem_findings(), &ReportContext::new("family.ged"));

    assert!(text.contains("Total findings: 5 (3 errors, 1 warnings, 1 info)"));
    let sections: Vec<_> = ["COMPLETENESS (1)", "CONSISTENCY (1)", "CROSS_REFERENCE (2)", "FORMAT (1)"]
        .iter()
        .map(|heading| text.find(heading).unwrap())
        .collect();
    assert!(sections.windows(2).all(|w| w[0] < w[1]));
    assert!(text.contains("Value:       'ABT 1850'"));
}

#[test]
fn test_json_report_parses_back() {
    let json = render_json(&problem_findings()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["summary"]["errors"], 3);
    assert_eq!(value["summary"]["total"], 5);
    let findings: Findings = serde_json::from_value(value["findings"].clone()).unwrap();
    assert_eq!(findings, problem_findings());
}

#[test]
#[serial]
fn test_colored_text_report() {
    colored::control::set_override(true);
    let ctx = ReportContext::new("family.ged").with_color(true);
    let text = render_text(&problem_findings(), &ctx);
    colored::control::unset_override();

    assert!(text.contains("\u{1b}["));
}

#[test]
#[serial]
fn test_plain_text_report_ignores_forced_color() {
    colored::control::set_override(true);
    let text = render_text(&problem_findings(), &ReportContext::new("family.ged"));
    colored::control::unset_override();

    assert!(!text.contains("\u{1b}["));
}
