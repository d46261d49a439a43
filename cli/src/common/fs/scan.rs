//! # Squeeze Path Discovery
//!
//! File: cli/src/common/fs/scan.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! Walks the input directory and returns the files that should go into the
//! archive, as absolute paths in a stable order (entries sorted by file name
//! within each directory, depth-first).
//!
//! - Only regular files are returned; symbolic links are followed when they
//!   point at a regular file, and skipped otherwise.
//! - Without recursion only the direct children of the root are considered.
//! - Files whose (lower-cased) extension is in the exclude set are skipped.
//!
//! Any walk error (permission denied, a directory vanishing mid-walk) aborts
//! discovery with `SqueezeError::Discovery`; partial listings are never returned.
//!
use crate::common::fs::group::extension_of;
use crate::core::error::{Result, SqueezeError};
use anyhow::anyhow;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};
use walkdir::WalkDir;

/// Collects the files below `root` that should be archived.
///
/// # Arguments
///
/// * `root` - Directory to walk. Expected to be absolute (see `core::config`).
/// * `recursive` - Whether to descend into subdirectories.
/// * `exclude` - Normalized extensions (`.jpg`) to skip.
///
/// # Errors
///
/// Returns `SqueezeError::Discovery` for any error reported by the walk.
pub fn scan(root: &Path, recursive: bool, exclude: &BTreeSet<String>) -> Result<Vec<PathBuf>> {
    info!(
        "Scanning {} (recursive: {}, excluded: {:?})",
        root.display(),
        recursive,
        exclude
    );

    let max_depth = if recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(root)
        .min_depth(1) // The root itself is never an entry.
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name();

    let mut paths = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            anyhow!(SqueezeError::Discovery(format!(
                "Failed to walk {}: {}",
                root.display(),
                e
            )))
        })?;

        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            trace!("Skipping non-file entry {}", entry.path().display());
            continue;
        }

        if let Some(ext) = extension_of(entry.path()) {
            if exclude.contains(&ext) {
                debug!("Excluded by extension: {}", entry.path().display());
                continue;
            }
        }

        paths.push(entry.into_path());
    }

    info!("Discovered {} file(s) to archive", paths.len());
    Ok(paths)
}
