//! # Squeeze Command Modules
//!
//! File: cli/src/commands/mod.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! This module aggregates the command handlers called from `main.rs`. Squeeze
//! has no subcommands: a plain invocation packs, `--info` prints the
//! application info.
//!
//! - `pack`: Configuration, discovery, the archive pipeline and the summary
//! - `info`: Package metadata display
//!

/// The `--info` flag.
pub mod info;
/// The default action: pack a directory into one archive.
pub mod pack;
