//! CLI behaviour through the compiled binary

use crate::support::fixtures;
use crate::support::harness::TestHarness;

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_check_clean_file_succeeds() {
    let harness = TestHarness::new();
    harness.write("clean.ged", fixtures::CLEAN_TREE);

    let output = harness.run(&["check", "clean.ged"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Genealogy Data Quality Report"));
    assert!(text.contains("No issues found."));
    assert!(text.contains("(built-in defaults)"));
}

#[test]
fn test_check_exit_code_follows_fail_on() {
    let harness = TestHarness::new();
    harness.write("problems.ged", fixtures::PROBLEM_TREE);

    let failing = harness.run(&["check", "problems.ged"]);
    assert_eq!(failing.status.code(), Some(1));
    assert!(stdout(&failing).contains("death-before-birth"));

    let never = harness.run(&["check", "problems.ged", "--fail-on", "never"]);
    assert_eq!(never.status.code(), Some(0));
}

#[test]
fn test_fail_on_warning_catches_imprecision() {
    let harness = TestHarness::new();
    harness.write("problems.ged", fixtures::PROBLEM_TREE);
    harness.write(
        "rules.json",
        r#"{
            "consistency": { "enabled": false },
            "cross_reference": { "enabled": false },
            "completeness": { "enabled": false },
            "format": { "severity": { "imprecise-date": "warning" } }
        }"#,
    );

    let on_error = harness.run(&["check", "problems.ged", "-c", "rules.json"]);
    assert_eq!(on_error.status.code(), Some(0));

    let on_warning = harness.run(&[
        "check",
        "problems.ged",
        "-c",
        "rules.json",
        "--fail-on",
        "warning",
    ]);
    assert_eq!(on_warning.status.code(), Some(1));
}

#[test]
fn test_check_json_output() {
    let harness = TestHarness::new();
    harness.write("problems.ged", fixtures::PROBLEM_TREE);

    let output = harness.run(&["check", "problems.ged", "--format", "json", "--parallel"]);
    assert_eq!(output.status.code(), Some(1));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["summary"]["total"], 5);
    assert_eq!(value["findings"][0]["code"], "missing-field");
    assert_eq!(value["findings"][0]["location"]["id"], "I2");
}

#[test]
fn test_check_writes_report_file() {
    let harness = TestHarness::new();
    harness.write("problems.ged", fixtures::PROBLEM_TREE);

    let output = harness.run(&["check", "problems.ged", "-o", "report.txt"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Report written to report.txt"));

    let report = harness.read("report.txt");
    assert!(report.contains("Total findings: 5"));
    assert!(!report.contains("\u{1b}["));
}

#[test]
fn test_check_with_generous_timeout() {
    let harness = TestHarness::new();
    harness.write("problems.ged", fixtures::PROBLEM_TREE);

    let output = harness.run(&["check", "problems.ged", "--timeout-secs", "600"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!stderr(&output).contains("Timed out"));
}

#[test]
fn test_invalid_date_reported() {
    let harness = TestHarness::new();
    harness.write("dates.ged", fixtures::MALFORMED_DATE_TREE);

    let output = harness.run(&["check", "dates.ged", "--format", "json"]);
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let codes: Vec<_> = value["findings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["code"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(codes, vec!["invalid-date"]);
}

#[test]
fn test_syntax_error_exits_with_two() {
    let harness = TestHarness::new();
    harness.write("broken.ged", fixtures::BROKEN_SYNTAX);

    let output = harness.run(&["check", "broken.ged"]);
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("Failed to load broken.ged"));
    assert!(err.contains("line 3"));
}

#[test]
fn test_missing_gedcom_exits_with_two() {
    let harness = TestHarness::new();
    let output = harness.run(&["check", "nowhere.ged"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("nowhere.ged"));
}

#[test]
fn test_bad_rules_file_exits_with_two() {
    let harness = TestHarness::new();
    harness.write("clean.ged", fixtures::CLEAN_TREE);
    harness.write("rules.json", r#"{ "order": "format" }"#);

    let output = harness.run(&["check", "clean.ged", "-c", "rules.json"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Failed to load rules from rules.json"));
}

#[test]
fn test_init_writes_default_rules() {
    let harness = TestHarness::new();

    let output = harness.run(&["init"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(harness.exists("gedlint.json"));

    let value: serde_json::Value = serde_json::from_str(&harness.read("gedlint.json")).unwrap();
    assert_eq!(value["strict"], false);
    assert_eq!(value["completeness"]["enabled"], true);

    let again = harness.run(&["init"]);
    assert_eq!(again.status.code(), Some(2));
    assert!(stderr(&again).contains("already exists"));

    let forced = harness.run(&["init", "--force"]);
    assert_eq!(forced.status.code(), Some(0));
}

#[test]
fn test_init_yaml_is_loadable() {
    let harness = TestHarness::new();
    harness.write("clean.ged", fixtures::CLEAN_TREE);

    let init = harness.run(&["init", "rules.yaml", "-q"]);
    assert_eq!(init.status.code(), Some(0));
    assert!(stdout(&init).is_empty());

    let output = harness.run(&["check", "clean.ged", "-c", "rules.yaml"]);
    assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout(&output));
    assert!(stdout(&output).contains("rules.yaml"));
}

#[test]
fn test_rules_lists_every_code() {
    let harness = TestHarness::new();
    let output = harness.run(&["rules"]);
    assert_eq!(output.status.code(), Some(0));

    let text = stdout(&output);
    for code in [
        "invalid-date",
        "missing-field",
        "death-before-birth",
        "ancestry-cycle",
        "invalid-config",
        "check-failed",
    ] {
        assert!(text.contains(code), "missing {}", code);
    }
}

#[test]
fn test_version() {
    let harness = TestHarness::new();
    let output = harness.run(&["version"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output).trim(),
        format!("gedlint {}", env!("CARGO_PKG_VERSION"))
    );

    let verbose = harness.run(&["version", "-v"]);
    assert!(stdout(&verbose).contains("commit:"));
}
