//! Command handlers for the gedlint CLI

pub mod check;
pub mod init;
pub mod rules;
