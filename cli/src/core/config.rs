//! # Squeeze Configuration System
//!
//! File: cli/src/core/config.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! This module turns the raw inputs of a run (command-line flags and an optional
//! TOML config file) into a validated `RunConfig`. Once a `RunConfig` exists the
//! rest of the program can trust it: the archive format is known, the input path
//! is an existing directory, the output directory exists, and the exclude set is
//! normalized.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Command-line flags (`Overrides`)
//! 2. The config file: `$SQUEEZE_CONFIG` if set, otherwise `config.toml` in the
//!    platform config directory (e.g. `~/.config/squeeze/config.toml`)
//! 3. Default values defined in the code
//!
//! The config file only carries defaults:
//!
//! ```toml
//! [defaults]
//! mode = "tar.gz"
//! output = "~/archives"
//! recursive = true
//! exclude = ["log", ".tmp"]
//! ```
//!
//! ## Examples
//!
//! ```rust
//! let file_cfg = config::load_file_config(args.config.as_deref())?;
//! let run_cfg = config::resolve(overrides, file_cfg, &std::env::current_dir()?)?;
//! println!("Packing {} into {}", run_cfg.input.display(), run_cfg.output.display());
//! ```
//!
use crate::common::archive::ArchiveFormat;
use crate::common::fs::io::ensure_dir_exists;
use crate::core::error::{Result, SqueezeError};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Represents the config file, loaded from TOML.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)] // Error if unknown fields are in TOML
pub struct FileConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// Default values for a run, overridden by command-line flags.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Archive format: `zip` or `tar.gz`.
    pub mode: Option<String>,
    /// Output directory (can use ~).
    pub output: Option<String>,
    /// Whether to descend into subdirectories.
    pub recursive: Option<bool>,
    /// Extensions to skip, with or without the leading dot.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Values given on the command line. `None` / empty means "not given".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub mode: Option<String>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub recursive: Option<bool>,
    pub exclude: Vec<String>,
}

/// The validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub format: ArchiveFormat,
    /// Absolute path of an existing directory.
    pub input: PathBuf,
    /// Absolute path of an existing directory.
    pub output: PathBuf,
    pub recursive: bool,
    /// Lower-cased, dot-prefixed extensions (e.g. `.jpg`).
    pub exclude: BTreeSet<String>,
}

const CONFIG_FILENAME: &str = "config.toml";
const DEFAULT_MODE: &str = "zip";

/// Loads the config file.
///
/// With an explicit path (from `--config` or `$SQUEEZE_CONFIG`) the file must
/// exist. Without one, the platform config directory is checked and a missing
/// file simply yields the defaults.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = explicit {
        info!("Loading configuration from: {}", path.display());
        if !path.is_file() {
            return Err(anyhow!(SqueezeError::Config(format!(
                "Config file not found: {}",
                path.display()
            ))));
        }
        return load_config_from_path(path);
    }

    match ProjectDirs::from("com", "Squeeze", "squeeze") {
        Some(proj_dirs) => {
            let config_path = proj_dirs.config_dir().join(CONFIG_FILENAME);
            if config_path.is_file() {
                info!("Loading user configuration from: {}", config_path.display());
                load_config_from_path(&config_path)
            } else {
                debug!(
                    "User configuration file not found at {}",
                    config_path.display()
                );
                Ok(FileConfig::default())
            }
        }
        None => {
            debug!("Could not determine user config directory.");
            Ok(FileConfig::default())
        }
    }
}

fn load_config_from_path(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content).map_err(|e| {
        anyhow!(SqueezeError::Config(format!(
            "Failed to parse TOML from file {}: {}",
            path.display(),
            e
        )))
    })
}

/// Merges flags over the config file and validates the result.
///
/// # Arguments
///
/// * `overrides` - Values taken from the command line.
/// * `file` - The loaded config file (or its defaults).
/// * `cwd` - Directory used for relative paths and as the input/output default.
///
/// # Errors
///
/// Returns `SqueezeError::Config` if the mode is unknown, the input path is
/// missing or not a directory, or the output directory cannot be created.
pub fn resolve(overrides: Overrides, file: FileConfig, cwd: &Path) -> Result<RunConfig> {
    let defaults = file.defaults;

    let mode = overrides
        .mode
        .or(defaults.mode)
        .unwrap_or_else(|| DEFAULT_MODE.to_string());
    let format: ArchiveFormat = mode
        .parse()
        .map_err(|_| anyhow!(SqueezeError::Config(format!("invalid mode: {}", mode))))?;

    let input = match overrides.input {
        Some(path) => absolutize(&expand_path(&path.to_string_lossy()), cwd),
        None => cwd.to_path_buf(),
    };
    if !input.exists() {
        return Err(anyhow!(SqueezeError::Config(format!(
            "invalid input path: {} does not exist",
            input.display()
        ))));
    }
    if !input.is_dir() {
        return Err(anyhow!(SqueezeError::Config(format!(
            "invalid input path: {} is not a directory",
            input.display()
        ))));
    }

    let output = match (overrides.output, defaults.output) {
        (Some(path), _) => absolutize(&expand_path(&path.to_string_lossy()), cwd),
        (None, Some(path)) => absolutize(&expand_path(&path), cwd),
        (None, None) => cwd.to_path_buf(),
    };
    ensure_dir_exists(&output).map_err(|e| {
        anyhow!(SqueezeError::Config(format!(
            "invalid output path: {}: {:#}",
            output.display(),
            e
        )))
    })?;

    let recursive = overrides.recursive.or(defaults.recursive).unwrap_or(true);

    let raw_exclude = if overrides.exclude.is_empty() {
        defaults.exclude
    } else {
        overrides.exclude
    };
    let exclude = normalize_extensions(&raw_exclude);

    let config = RunConfig {
        format,
        input,
        output,
        recursive,
        exclude,
    };
    debug!("Resolved run configuration: {:?}", config);
    Ok(config)
}

/// Normalizes user-supplied extensions to the `.ext` lower-case form.
///
/// `"JPG"`, `".jpg"` and `" jpg "` all become `".jpg"`; empty items are dropped.
pub fn normalize_extensions(raw: &[String]) -> BTreeSet<String> {
    raw.iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
        .collect()
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
