//! # Squeeze Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! This module groups the filesystem work that happens before any archive is
//! opened: finding the files, bucketing them by extension, and making sure the
//! output directory exists.
//!
//! ## Architecture
//!
//! - **`scan`**: Walks the input directory (`walkdir`) honoring the recursion flag and the exclude set.
//! - **`group`**: Buckets paths by lower-cased extension into an ordered `PathGroups` map.
//! - **`io`**: `ensure_dir_exists`, used for the output directory.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::fs::{group, scan};
//!
//! # fn run_example(cfg: &crate::core::config::RunConfig) -> crate::core::error::Result<()> {
//! let paths = scan::scan(&cfg.input, cfg.recursive, &cfg.exclude)?;
//! let groups = group::by_extension(paths);
//! println!("{} extension group(s)", groups.len());
//! # Ok(())
//! # }
//! ```
//!

/// Groups paths by extension (e.g. `by_extension`, `extension_of`).
pub mod group;
/// Basic directory preparation (e.g. `ensure_dir_exists`).
pub mod io;
/// Directory discovery (e.g. `scan`).
pub mod scan;
