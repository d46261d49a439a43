//! # Squeeze Info Command
//!
//! File: cli/src/commands/info.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! Implements `squeeze --info`: prints the application name, description,
//! version and repository taken from the package metadata, then exits.
//!
use console::style;

/// The `label: value` lines shown by `--info`.
pub fn info_lines() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Name", env!("CARGO_PKG_NAME")),
        ("Description", env!("CARGO_PKG_DESCRIPTION")),
        ("Version", env!("CARGO_PKG_VERSION")),
        ("Github", env!("CARGO_PKG_REPOSITORY")),
    ]
}

/// Prints the application info to stdout.
pub fn handle_info() {
    for (label, value) in info_lines() {
        println!("{} {}", style(format!("{}:", label)).green(), value);
    }
}
