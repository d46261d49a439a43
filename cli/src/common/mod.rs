//! # Squeeze Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! This module is the root for the shared building blocks of Squeeze. Command
//! logic lives in `commands::`, configuration and errors in `core::`; everything
//! that actually touches files or the terminal lives here.
//!
//! ## Architecture
//!
//! - **`archive`**: The archive-writing engine: `ArchiveBackend` (zip, tar.gz),
//!   entry naming and copying, and `ArchiveSession` with its `SaveResult`.
//! - **`fs`**: Directory discovery (`scan`), grouping by extension (`group`) and
//!   small helpers such as `io::ensure_dir_exists`.
//! - **`ui`**: Terminal output: the summary table, styled errors, the optional
//!   exit pause.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::{archive, fs};
//! use std::collections::BTreeSet;
//! use std::path::Path;
//!
//! # fn run() -> anyhow::Result<()> {
//! let paths = fs::scan::scan(Path::new("./docs"), true, &BTreeSet::new())?;
//! let groups = fs::group::by_extension(paths);
//! let mut session = archive::ArchiveSession::open(archive::ArchiveFormat::Zip, Path::new("."))?;
//! for (key, paths) in &groups {
//!     for path in paths {
//!         session.write(key, path)?;
//!     }
//! }
//! session.save(Path::new("."))?;
//! # Ok(())
//! # }
//! ```
//!

/// The archive-writing engine (backends, entries, sessions).
pub mod archive;
/// Filesystem discovery, grouping and helpers.
pub mod fs;
/// Terminal output for reports, errors and prompts.
pub mod ui;
