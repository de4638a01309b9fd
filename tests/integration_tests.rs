//! Integration tests runner

#[path = "common.rs"]
mod common;

#[path = "support/mod.rs"]
mod support;

#[path = "integration/validation_test.rs"]
mod validation_test;

#[path = "integration/config_test.rs"]
mod config_test;

#[path = "integration/report_test.rs"]
mod report_test;

#[path = "integration/cli_test.rs"]
mod cli_test;

#[path = "integration/property_test.rs"]
mod property_test;
