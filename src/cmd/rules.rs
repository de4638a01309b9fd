//! List check categories and their finding codes

use anyhow::Result;
use colored::Colorize;

use gedlint::checks::{CheckRegistry, CodeInfo};
use gedlint::findings::{Severity, CONFIG_CATEGORY, ENGINE_CATEGORY};
use gedlint::{config, engine};

pub fn cmd_rules() -> Result<()> {
    let registry = CheckRegistry::builtin();

    for check in registry.iter() {
        print_section(check.category(), check.codes());
    }
    print_section(CONFIG_CATEGORY, config::CODES);
    print_section(ENGINE_CATEGORY, engine::CODES);

    println!(
        "{}",
        "Override severities per category with \"severity\" in the rules file.".dimmed()
    );
    Ok(())
}

fn print_section(category: &str, codes: &[CodeInfo]) {
    println!("{}", category.bold());
    for info in codes {
        println!(
            "  {:<26} {} {}",
            info.code,
            severity_label(info.severity),
            info.summary
        );
    }
    println!();
}

fn severity_label(severity: Severity) -> String {
    let label = format!("{:<9}", severity.as_str());
    match severity {
        Severity::Error => label.red().to_string(),
        Severity::Warning => label.yellow().to_string(),
        Severity::Info => label.cyan().to_string(),
    }
}
