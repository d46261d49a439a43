//! # Squeeze Archive Engine (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! This module is the archive-writing engine. It accepts a stream of
//! (group key, file path) pairs, writes each file as an entry into an archive
//! that grows under a temporary name, and either renames the finished archive
//! into place or deletes it.
//!
//! ## Architecture
//!
//! - **`ArchiveBackend`** (this file): the capability every format implements:
//!   write one entry, finalize the writer stack, or discard everything.
//! - **`zip`**: Zip backend (`zip` crate, deflated entries).
//! - **`tar`**: Gzipped tarball backend (`tar` framing inside a `flate2` gzip stream).
//! - **`entry`**: Entry naming and the source-file side of an entry write.
//! - **`session`**: `ArchiveSession`, the state machine written once against
//!   `ArchiveBackend`: counter, cancellation checks, timestamped naming, atomic
//!   rename, `SaveResult`.
//!
//! Backends create their temporary file in a caller-chosen scratch directory.
//! The pack command uses the output directory, so the final rename never
//! crosses filesystems.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::archive::{ArchiveFormat, ArchiveSession};
//! use std::path::Path;
//!
//! # fn run() -> anyhow::Result<()> {
//! let out = Path::new("./out");
//! let mut session = ArchiveSession::open(ArchiveFormat::Zip, out)?;
//! session.write(".txt", Path::new("./notes.txt"))?;
//! let saved = session.save(out)?;
//! println!("{} ({} entries)", saved.archive_path().display(), saved.archived_count());
//! # Ok(())
//! # }
//! ```
//!
use crate::core::error::{Result, SqueezeError};
use anyhow::anyhow;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use tempfile::TempPath;
use tracing::debug;

pub mod entry;
pub mod session;
pub mod tar;
pub mod zip;

pub use entry::EntrySource;
pub use session::{ArchiveSession, SaveResult};

/// The archive formats Squeeze can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    /// File extension of the produced archive, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ArchiveFormat {
    type Err = SqueezeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "zip" => Ok(ArchiveFormat::Zip),
            "tar.gz" => Ok(ArchiveFormat::TarGz),
            other => Err(SqueezeError::Config(format!("invalid mode: {}", other))),
        }
    }
}

/// A format-specific archive writer that owns its temporary file.
///
/// Implementations are driven by `ArchiveSession` and never see group keys or
/// destination paths: they get a finished entry name and an open source, and
/// hand the sealed temporary file back on `finalize`.
pub trait ArchiveBackend: Send {
    /// The format this backend writes.
    fn format(&self) -> ArchiveFormat;

    /// Appends one entry named `name` holding every byte of `source`.
    ///
    /// Read-side failures are reported as `SqueezeError::Io`, writer-side
    /// failures as `SqueezeError::Write`. Either one leaves the archive in an
    /// undefined state; the caller must discard.
    fn write_entry(&mut self, name: &str, source: &mut EntrySource) -> Result<()>;

    /// Flushes and closes the whole writer stack, then the file handle.
    ///
    /// On success the returned `TempPath` names a complete archive that the
    /// caller may rename. On failure the temporary file is already removed.
    fn finalize(self: Box<Self>) -> Result<TempPath>;

    /// Drops the writer stack ignoring errors and removes the temporary file.
    fn discard(self: Box<Self>);
}

/// Opens the backend for `format` with its temporary file in `scratch_dir`.
pub fn open_backend(format: ArchiveFormat, scratch_dir: &Path) -> Result<Box<dyn ArchiveBackend>> {
    Ok(match format {
        ArchiveFormat::Zip => Box::new(zip::ZipBackend::open(scratch_dir)?),
        ArchiveFormat::TarGz => Box::new(tar::TarGzBackend::open(scratch_dir)?),
    })
}

/// Creates the hidden temporary archive file shared by both backends.
///
/// The file is named `.squeeze-XXXXXX.<ext>.part` and is removed when the
/// returned `TempPath` is dropped, unless it has been persisted.
pub(crate) fn create_temp_file(
    scratch_dir: &Path,
    format: ArchiveFormat,
) -> Result<(File, TempPath)> {
    let suffix = format!(".{}.part", format.extension());
    let temp = tempfile::Builder::new()
        .prefix(".squeeze-")
        .suffix(&suffix)
        .tempfile_in(scratch_dir)
        .map_err(|e| {
            anyhow!(SqueezeError::Resource(format!(
                "cannot create temporary archive in {}: {}",
                scratch_dir.display(),
                e
            )))
        })?;
    debug!("Created temporary archive file {}", temp.path().display());
    Ok(temp.into_parts())
}

/// Syncs and closes the archive file handle, returning the path for the rename.
///
/// Errors from `sync_all` are the last chance to see a failed write-back before
/// the handle is dropped; on error `temp` is dropped here, removing the file.
pub(crate) fn seal_file(file: File, temp: TempPath) -> Result<TempPath> {
    file.sync_all().map_err(|e| {
        anyhow!(SqueezeError::Finalize(format!(
            "cannot flush archive file to disk: {}",
            e
        )))
    })?;
    drop(file);
    Ok(temp)
}
