//! Common test helpers for integration tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use gedlint::findings::Findings;

pub fn gedlint_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_gedlint"))
}

/// Run the binary in `dir` with logging env vars cleared.
pub fn run_gedlint(dir: &Path, args: &[&str]) -> std::io::Result<Output> {
    Command::new(gedlint_binary())
        .args(args)
        .current_dir(dir)
        .env_remove("GEDLINT_LOG")
        .env_remove("RUST_LOG")
        .output()
}

/// Codes in emission order.
pub fn codes(findings: &Findings) -> Vec<&str> {
    findings.iter().map(|f| f.code.as_str()).collect()
}

/// Findings with `code` whose location refers to record `id`.
pub fn count_at(findings: &Findings, code: &str, id: &str) -> usize {
    findings
        .with_code(code)
        .filter(|f| f.location.record_id() == Some(id))
        .count()
}
