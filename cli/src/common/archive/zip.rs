//! # Squeeze Zip Backend (`common::archive::zip`)
//!
//! File: cli/src/common/archive/zip.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! Writes `.zip` archives with the `zip` crate. Each entry is deflated and
//! carries the source file's unix permissions when the platform exposes them.
//! Files of 4 GiB or more are written as zip64 entries.
//!
//! The writer stack is `ZipWriter<BufWriter<File>>` over a hidden temporary
//! file. `finalize` writes the central directory, flushes the buffer, syncs the
//! file, and only then hands the path to the session for the rename.
//!
use super::entry::EntrySource;
use super::{create_temp_file, seal_file, ArchiveBackend, ArchiveFormat};
use crate::core::error::{Result, SqueezeError};
use ::zip::write::FileOptions;
use ::zip::{CompressionMethod, ZipWriter};
use anyhow::anyhow;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use tempfile::TempPath;
use tracing::{debug, warn};

const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Zip archive under construction.
pub struct ZipBackend {
    // Field order matters: the writer must drop before the temp path removes the file.
    writer: ZipWriter<BufWriter<File>>,
    temp: TempPath,
}

impl ZipBackend {
    /// Creates the temporary file in `scratch_dir` and a zip writer bound to it.
    ///
    /// # Errors
    ///
    /// Returns `SqueezeError::Resource` if the temporary file cannot be created.
    pub fn open(scratch_dir: &Path) -> Result<Self> {
        let (file, temp) = create_temp_file(scratch_dir, ArchiveFormat::Zip)?;
        let writer = ZipWriter::new(BufWriter::new(file));
        Ok(Self { writer, temp })
    }
}

impl ArchiveBackend for ZipBackend {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    fn write_entry(&mut self, name: &str, source: &mut EntrySource) -> Result<()> {
        let mut options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(source.len() >= ZIP64_THRESHOLD);
        if let Some(mode) = source.unix_mode() {
            options = options.unix_permissions(mode);
        }

        self.writer
            .start_file(name, options)
            .map_err(|e| source.failure(name, e))?;
        io::copy(&mut *source, &mut self.writer).map_err(|e| source.failure(name, e))?;
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<TempPath> {
        let ZipBackend { mut writer, temp } = *self;
        debug!("Writing zip central directory to {}", temp.display());

        // On any error below `temp` is dropped, which removes the file.
        let buffered = writer
            .finish()
            .map_err(|e| anyhow!(SqueezeError::Finalize(format!("cannot close zip writer: {}", e))))?;
        let file = buffered.into_inner().map_err(|e| {
            anyhow!(SqueezeError::Finalize(format!(
                "cannot flush zip archive: {}",
                e.error()
            )))
        })?;
        seal_file(file, temp)
    }

    fn discard(self: Box<Self>) {
        let ZipBackend { writer, temp } = *self;
        drop(writer);
        if let Err(e) = temp.close() {
            warn!("Could not remove temporary zip archive: {}", e);
        }
    }
}
