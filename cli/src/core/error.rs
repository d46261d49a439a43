//! # Squeeze Error Types
//!
//! File: cli/src/core/error.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! This module defines the error taxonomy used throughout Squeeze. Every failure
//! that can stop a run falls into one of the `SqueezeError` variants, which keeps
//! the final console message predictable and lets callers (and tests) tell the
//! categories apart.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `SqueezeError`: A custom error enum using `thiserror` for the specific error kinds
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible propagation with context
//!
//! The categories follow the lifecycle of a run:
//! - `Config`: invalid mode, unusable input/output paths, broken config file
//! - `Discovery`: the directory walk failed
//! - `Resource`: the temporary archive file or writer could not be allocated
//! - `Io`: a source file could not be opened or read
//! - `Write`: the archive writer rejected an entry
//! - `Finalize`: closing the writer stack, renaming or stat-ing the archive failed
//! - `Cancelled` / `SessionClosed`: lifecycle violations of the archive session
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error kind wrapped in anyhow
//! if !path.is_dir() {
//!     anyhow::bail!(SqueezeError::Config(format!("Input path is not a directory: {}", path.display())));
//! }
//!
//! // Pattern matching on error kinds
//! match session.write("txt", &path) {
//!     Err(e) if matches!(e.downcast_ref::<SqueezeError>(), Some(SqueezeError::Io { .. })) => {
//!         // source file vanished
//!     }
//!     other => other?,
//! }
//! ```
//!
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for the Squeeze application.
#[derive(Error, Debug)]
pub enum SqueezeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Could not allocate archive resources: {0}")]
    Resource(String),

    // The io error is the `source`; `{:#}` at the boundary appends it.
    #[error("Failed to read source file '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write archive entry '{entry}': {reason}")]
    Write { entry: String, reason: String },

    #[error("Failed to finalize archive: {0}")]
    Finalize(String),

    #[error("Operation cancelled.")]
    Cancelled,

    #[error("Archive session is already closed.")]
    SessionClosed,
}

/// Type alias for Result using anyhow::Error for broad compatibility.
/// Anyhow allows for easy context addition and flexible error handling.
pub type Result<T> = anyhow::Result<T>;

/// Returns the `SqueezeError` at the root of an `anyhow` chain, if there is one.
///
/// Context layers added with `.context(..)` sit on top of the original error, so
/// a plain `downcast_ref` on the outer error would miss it.
pub fn kind_of(err: &anyhow::Error) -> Option<&SqueezeError> {
    err.chain().find_map(|cause| cause.downcast_ref::<SqueezeError>())
}
