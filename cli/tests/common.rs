//! # Squeeze CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Every test runs
//! the compiled `squeeze` binary against its own temporary directories, with
//! `SQUEEZE_CONFIG` pointing at an empty config file so a config in the
//! developer's home directory can never leak into a test.
//!

// Allow potentially unused code in this common module, as different test files might use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary input, output and config locations for one test.
pub struct Workspace {
    root: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir_all(root.path().join("in")).unwrap();
        fs::write(root.path().join("config.toml"), "").unwrap();
        Self { root }
    }

    pub fn input(&self) -> PathBuf {
        self.root.path().join("in")
    }

    pub fn output(&self) -> PathBuf {
        self.root.path().join("out")
    }

    pub fn config(&self) -> PathBuf {
        self.root.path().join("config.toml")
    }

    /// Writes `contents` to `in/<rel>`, creating parent directories.
    pub fn file(&self, rel: &str, contents: &str) -> &Self {
        let path = self.input().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
        self
    }

    /// `report.csv` and `photo.jpg` at the top, `docs/notes.txt` one level down.
    pub fn with_sample_tree(self) -> Self {
        self.file("report.csv", "a,b\n1,2\n")
            .file("photo.jpg", "not really a jpeg")
            .file("docs/notes.txt", "remember the milk");
        self
    }

    /// A `squeeze` command reading the empty config file and writing to `out/`,
/// at the default log level.
    pub fn cmd(&self) -> Command {
        let mut cmd = squeeze_cmd();
        cmd.env("SQUEEZE_CONFIG", self.config())
            .env_remove("RUST_LOG")
            .arg("-i")
            .arg(self.input())
            .arg("-o")
            .arg(self.output());
        cmd
    }

    /// Files in the output directory (the archive and anything left over).
    pub fn output_files(&self) -> Vec<PathBuf> {
        match fs::read_dir(self.output()) {
            Ok(entries) => {
                let mut files: Vec<PathBuf> = entries.map(|e| e.unwrap().path()).collect();
                files.sort();
                files
            }
            Err(_) => Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }
}

/// # Get Squeeze Command (`squeeze_cmd`)
///
/// Creates an `assert_cmd::Command` for the compiled `squeeze` binary.
///
/// ## Panics
/// Panics if the `squeeze` binary cannot be found via `Command::cargo_bin`.
pub fn squeeze_cmd() -> Command {
    Command::cargo_bin("squeeze").expect("Failed to find squeeze binary for testing")
}
