//! Write a default rules file

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use gedlint::checks::CheckRegistry;
use gedlint::config::{default_document, SourceFormat};

pub fn cmd_init(path: &Path, force: bool, quiet: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        );
    }

    let document = default_document(&CheckRegistry::builtin())
        .context("Failed to build the default rules document")?;
    let content = match SourceFormat::from_path(path) {
        SourceFormat::Yaml => serde_yaml::to_string(&document)?,
        SourceFormat::Json => serde_json::to_string_pretty(&document)? + "\n",
    };

    fs::write(path, content)
        .with_context(|| format!("Failed to write rules to {}", path.display()))?;

    if !quiet {
        println!("{} Wrote {}", "✓".green(), path.display());
    }
    Ok(())
}
