//! # Squeeze Extension Grouping
//!
//! File: cli/src/common/fs/group.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! Groups discovered paths by lower-cased extension (`.csv`, `.txt`, ...).
//! Files whose name has no `.` at all share the `unknown` group; dotfiles
//! such as `.bashrc` are their own group. Keys iterate in
//! lexicographic order and each group keeps the discovery order of its paths,
//! so the resulting archive layout is reproducible.
//!
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Group key used for files that have no extension.
pub const UNKNOWN_GROUP: &str = "unknown";

/// Group key → paths sharing that key, in discovery order.
pub type PathGroups = BTreeMap<String, Vec<PathBuf>>;

/// Returns the dot-prefixed, lower-cased extension of `path`, if it has one.
///
/// The extension is everything from the last `.` of the file name on, dot
/// included: `archive.tar.gz` → `.gz`, `.bashrc` → `.bashrc`, `name.` → `.`.
/// Only a file name without any `.` has no extension.
pub fn extension_of(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let dot = name.rfind('.')?;
    Some(name[dot..].to_lowercase())
}

/// Buckets `paths` by extension.
pub fn by_extension(paths: Vec<PathBuf>) -> PathGroups {
    let mut groups = PathGroups::new();
    for path in paths {
        let key = extension_of(&path).unwrap_or_else(|| UNKNOWN_GROUP.to_string());
        groups.entry(key).or_default().push(path);
    }
    groups
}

/// Total number of paths across all groups.
pub fn total_paths(groups: &PathGroups) -> usize {
    groups.values().map(Vec::len).sum()
}
