//! # gedlint - data-quality checks for GEDCOM files
//!
//! gedlint validates genealogical records (individuals, families and their
//! events) against configurable rules and reports every problem it finds as
//! a structured [`Finding`](findings::Finding).
//!
//! ## Modules
//!
//! - [`model`] - record model, date grammar and the [`RecordSource`](model::RecordSource) trait
//! - [`config`] - rule configuration documents (JSON or YAML)
//! - [`checks`] - format, completeness, consistency and cross-reference checks
//! - [`engine`] - runs enabled checks and merges their findings in a fixed order
//! - [`findings`] - severities, locations and the ordered findings collection
//! - [`gedcom`] - GEDCOM file loader
//! - [`report`] - text and JSON renderers
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use gedlint::config::RuleConfiguration;
//! use gedlint::engine::ValidationEngine;
//!
//! let records = gedlint::gedcom::load_file(Path::new("family.ged"))
//!     .expect("Failed to load GEDCOM");
//! let rules = RuleConfiguration::load(Path::new("gedlint.json"))
//!     .expect("Failed to load rules");
//!
//! let findings = ValidationEngine::new().run(&records, &rules);
//! for finding in &findings {
//!     println!("{} {} {}", finding.severity, finding.location, finding.message);
//! }
//! ```

pub mod checks;
pub mod config;
pub mod engine;
pub mod findings;
pub mod gedcom;
pub mod model;
pub mod report;
