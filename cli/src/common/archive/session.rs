//! # Squeeze Archive Session (`common::archive::session`)
//!
//! File: cli/src/common/archive/session.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! `ArchiveSession` is the unit of work for one archive. It owns a backend
//! (and through it the temporary file and writer stack), counts the entries
//! written so far, and decides when the archive becomes visible under its final
//! name.
//!
//! ## Lifecycle
//!
//! ```text
//!            write (0..n times)
//!               ┌────┐
//!               ▼    │
//!   open ──▶  Open ──┘ ──close(false)──▶ Closed ──rename──▶ Finalized
//!               │                          │
//!               └──close(true)─────────────┴──close(true)──▶ Discarded
//! ```
//!
//! - `save` runs `close(false)`, the rename and the stat in one call, and is
//!   only accepted from `Open`.
//! - The first failed `write` poisons the session: later writes and `save`
//!   are refused, and the caller is expected to `close(true)`.
//! - `close(true)` is idempotent on a discarded session and refuses to touch
//!   a finalized archive.
//! - Dropping a session that was never finalized removes its temporary file.
//!
use super::entry;
use super::{open_backend, ArchiveBackend, ArchiveFormat};
use crate::core::error::{Result, SqueezeError};
use anyhow::anyhow;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting writes.
    Open,
    /// Writer stack closed; the complete archive waits under its temporary name.
    Closed,
    /// Renamed to its final path. Terminal.
    Finalized,
    /// Temporary file removed, nothing produced. Terminal.
    Discarded,
}

/// Outcome of a successful `save`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveResult {
    archive_path: PathBuf,
    archived_count: u64,
    archive_size: u64,
}

impl SaveResult {
    /// Absolute path of the archive.
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Number of entries written into the archive.
    pub fn archived_count(&self) -> u64 {
        self.archived_count
    }

    /// Size of the archive on disk, in bytes, read back after the rename.
    pub fn archive_size(&self) -> u64 {
        self.archive_size
    }
}

/// One archive being written.
pub struct ArchiveSession {
    format: ArchiveFormat,
    backend: Option<Box<dyn ArchiveBackend>>,
    sealed: Option<TempPath>,
    archived_count: u64,
    state: SessionState,
    poisoned: bool,
}

impl ArchiveSession {
    /// Opens a session writing `format`, with its temporary file in `scratch_dir`.
    ///
    /// # Errors
    ///
    /// Returns `SqueezeError::Resource` if the temporary file cannot be created.
    pub fn open(format: ArchiveFormat, scratch_dir: &Path) -> Result<Self> {
        let backend = open_backend(format, scratch_dir)?;
        info!("Opened {} archive session in {}", format, scratch_dir.display());
        Ok(Self::with_backend(backend))
    }

    /// Wraps an already opened backend.
    pub fn with_backend(backend: Box<dyn ArchiveBackend>) -> Self {
        Self {
            format: backend.format(),
            backend: Some(backend),
            sealed: None,
            archived_count: 0,
            state: SessionState::Open,
            poisoned: false,
        }
    }

    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Entries successfully written so far.
    pub fn archived_count(&self) -> u64 {
        self.archived_count
    }

    /// Writes the file at `path` as an entry of group `group_key`.
    ///
    /// The counter moves only after the whole file has been copied.
    ///
    /// # Errors
    ///
    /// - `SqueezeError::SessionClosed` if the session is not `Open` or a previous write failed.
    /// - `SqueezeError::Io` if the source cannot be opened or read.
    /// - `SqueezeError::Write` if the archive writer rejects the entry.
    pub fn write(&mut self, group_key: &str, path: &Path) -> Result<()> {
        if self.state != SessionState::Open || self.poisoned {
            return Err(anyhow!(SqueezeError::SessionClosed));
        }
        let backend = self
            .backend
            .as_mut()
            .ok_or_else(|| anyhow!(SqueezeError::SessionClosed))?;

        match entry::write_entry(backend.as_mut(), group_key, path) {
            Ok(_) => {
                self.archived_count += 1;
                Ok(())
            }
            Err(e) => {
                debug!("Write of {} failed, session is no longer usable", path.display());
                self.poisoned = true;
                Err(e)
            }
        }
    }

    /// Like `write`, but returns `SqueezeError::Cancelled` without touching the
    /// archive if `cancel` has been triggered.
    pub fn write_with_cancel(
        &mut self,
        cancel: &CancellationToken,
        group_key: &str,
        path: &Path,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            debug!("Cancellation observed before {}", path.display());
            return Err(anyhow!(SqueezeError::Cancelled));
        }
        self.write(group_key, path)
    }

    /// Finalizes the archive and moves it to `destination_dir/<timestamp>.<ext>`.
    ///
    /// # Errors
    ///
    /// - `SqueezeError::SessionClosed` if the session is not `Open` or a write failed.
    /// - `SqueezeError::Finalize` if closing the writer stack, the rename (the
    ///   destination already exists, or lies on another filesystem) or the stat
    ///   fails. The temporary file never survives a failed save.
    pub fn save(&mut self, destination_dir: &Path) -> Result<SaveResult> {
        if self.state != SessionState::Open || self.poisoned {
            return Err(anyhow!(SqueezeError::SessionClosed));
        }
        self.close(false)?;

        let temp = self
            .sealed
            .take()
            .ok_or_else(|| anyhow!(SqueezeError::SessionClosed))?;
        let archive_path = destination_dir.join(archive_file_name(self.format, &Local::now()));

        // The failed-persist error owns the temp path; dropping it removes the file.
        if let Err(e) = temp.persist_noclobber(&archive_path) {
            self.state = SessionState::Discarded;
            return Err(anyhow!(SqueezeError::Finalize(format!(
                "cannot move archive to {}: {}",
                archive_path.display(),
                e.error
            ))));
        }
        self.state = SessionState::Finalized;

        let archive_size = fs::metadata(&archive_path)
            .map_err(|e| {
                anyhow!(SqueezeError::Finalize(format!(
                    "cannot stat {}: {}",
                    archive_path.display(),
                    e
                )))
            })?
            .len();

        info!(
            "Saved {} ({} entries, {} bytes)",
            archive_path.display(),
            self.archived_count,
            archive_size
        );
        Ok(SaveResult {
            archive_path,
            archived_count: self.archived_count,
            archive_size,
        })
    }

    /// Closes the session.
    ///
    /// * `remove_anyway = false`: finalize the writer stack and keep the complete
    ///   archive under its temporary name for a following rename (`Closed`).
    ///   Only valid from `Open`.
    /// * `remove_anyway = true`: discard. Removes the temporary file from `Open`
    ///   or `Closed`; a no-op on an already discarded session.
    ///
    /// # Errors
    ///
    /// - `SqueezeError::SessionClosed` for a normal close outside `Open`, or a
    ///   discard of a finalized archive.
    /// - `SqueezeError::Finalize` if the writer stack cannot be closed (the
    ///   temporary file is removed and the session becomes `Discarded`).
    pub fn close(&mut self, remove_anyway: bool) -> Result<()> {
        match (self.state, remove_anyway) {
            (SessionState::Open, false) => {
                let backend = self
                    .backend
                    .take()
                    .ok_or_else(|| anyhow!(SqueezeError::SessionClosed))?;
                match backend.finalize() {
                    Ok(temp) => {
                        debug!("Archive sealed at {}", temp.display());
                        self.sealed = Some(temp);
                        self.state = SessionState::Closed;
                        Ok(())
                    }
                    Err(e) => {
                        self.state = SessionState::Discarded;
                        Err(e)
                    }
                }
            }
            (SessionState::Open, true) | (SessionState::Closed, true) => {
                if let Some(backend) = self.backend.take() {
                    backend.discard();
                }
                if let Some(temp) = self.sealed.take() {
                    if let Err(e) = temp.close() {
                        warn!("Could not remove temporary archive: {}", e);
                    }
                }
                self.state = SessionState::Discarded;
                info!("Archive session discarded after {} entries", self.archived_count);
                Ok(())
            }
            (SessionState::Discarded, true) => Ok(()),
            _ => Err(anyhow!(SqueezeError::SessionClosed)),
        }
    }
}

/// Builds the archive file name `YYYYMMDD_HHMMSS.<ext>` for `at`.
pub fn archive_file_name(format: ArchiveFormat, at: &DateTime<Local>) -> String {
    format!("{}.{}", at.format("%Y%m%d_%H%M%S"), format.extension())
}
