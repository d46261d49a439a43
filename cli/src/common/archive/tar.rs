//! # Squeeze TAR Archive Backend (`common::archive::tar`)
//!
//! File: cli/src/common/archive/tar.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! This module writes gzipped tarballs (`.tar.gz`) straight to a temporary file.
//!
//! ## Architecture
//!
//! The module leverages the `tar` crate for building the archive structure and
//! the `flate2` crate for Gzip compression:
//!
//! ```text
//! tar::Builder  ──frames──▶  flate2::write::GzEncoder  ──compresses──▶  File (.squeeze-*.tar.gz.part)
//! ```
//!
//! - Every entry gets a GNU header filled from the source metadata (size,
//!   mode, mtime). Long names are handled by the builder.
//! - Finalizing closes the stack from the inside out: `Builder::into_inner`
//!   writes the two zero blocks that end a tar archive *into* the compressor,
//!   then `GzEncoder::finish` writes the gzip trailer. A gzip trailer written
//!   before the tar trailer would leave the end-of-archive blocks outside the
//!   compressed stream; the ownership chain makes that order impossible here.
//!
use super::entry::EntrySource;
use super::{create_temp_file, seal_file, ArchiveBackend, ArchiveFormat};
use crate::core::error::{Result, SqueezeError};
use ::tar::{Builder, EntryType, Header};
use anyhow::anyhow;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tempfile::TempPath;
use tracing::{debug, warn};

/// Gzipped tarball under construction.
pub struct TarGzBackend {
    // Field order matters: the writer stack must drop before the temp path removes the file.
    builder: Builder<GzEncoder<File>>,
    temp: TempPath,
}

impl TarGzBackend {
    /// Creates the temporary file in `scratch_dir` and the tar-inside-gzip writer stack.
    ///
    /// # Errors
    ///
    /// Returns `SqueezeError::Resource` if the temporary file cannot be created.
    pub fn open(scratch_dir: &Path) -> Result<Self> {
        let (file, temp) = create_temp_file(scratch_dir, ArchiveFormat::TarGz)?;
        // Wrap the file with a Gzip encoder using default compression level.
        let encoder = GzEncoder::new(file, Compression::default());
        // Create a TAR archive builder that writes to the Gzip encoder.
        let builder = Builder::new(encoder);
        Ok(Self { builder, temp })
    }
}

impl ArchiveBackend for TarGzBackend {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::TarGz
    }

    fn write_entry(&mut self, name: &str, source: &mut EntrySource) -> Result<()> {
        let len = source.len();
        let mut header = Header::new_gnu();
        header.set_metadata(source.metadata());
        header.set_entry_type(EntryType::Regular);
        header.set_size(len);

        // The header promises `len` bytes; never copy more than that.
        self.builder
            .append_data(&mut header, name, (&mut *source).take(len))
            .map_err(|e| source.failure(name, e))?;
        source.ensure_fully_read()
    }

    fn finalize(self: Box<Self>) -> Result<TempPath> {
        let TarGzBackend { builder, temp } = *self;
        debug!("Closing tar.gz writer stack for {}", temp.display());

        // On any error below `temp` is dropped, which removes the file.
        // Inner framer first: the tar end-of-archive blocks go into the gzip stream.
        let encoder = builder.into_inner().map_err(|e| {
            anyhow!(SqueezeError::Finalize(format!(
                "cannot finalize tar archive structure: {}",
                e
            )))
        })?;
        // Outer compressor second: the gzip trailer covers everything framed above.
        let file = encoder.finish().map_err(|e| {
            anyhow!(SqueezeError::Finalize(format!(
                "cannot finish gzip compression stream: {}",
                e
            )))
        })?;
        seal_file(file, temp)
    }

    fn discard(self: Box<Self>) {
        let TarGzBackend { builder, temp } = *self;
        drop(builder);
        if let Err(e) = temp.close() {
            warn!("Could not remove temporary tar.gz archive: {}", e);
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::archive::entry::write_entry;
    use ::tar::Archive;
    use flate2::read::GzDecoder;
    use std::fs;
    use tempfile::tempdir;

    fn finished_archive(files: &[(&str, &[u8])], key: &str) -> (tempfile::TempDir, TempPath) {
        let src = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let mut backend: Box<dyn ArchiveBackend> =
            Box::new(TarGzBackend::open(scratch.path()).unwrap());
        for (name, data) in files {
            let path = src.path().join(name);
            fs::write(&path, data).unwrap();
            write_entry(backend.as_mut(), key, &path).unwrap();
        }
        (scratch, backend.finalize().unwrap())
    }

    #[test]
    fn test_round_trip_recovers_every_entry() {
        let big: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let files: Vec<(&str, &[u8])> = vec![
            ("a.txt", &b"alpha"[..]),
            ("b.txt", &b""[..]),
            ("c.bin", big.as_slice()),
        ];
        let (_scratch, temp) = finished_archive(&files, ".misc");

        let mut archive = Archive::new(GzDecoder::new(File::open(&temp).unwrap()));
        let mut recovered = Vec::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let path = entry.path().unwrap().to_string_lossy().into_owned();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            recovered.push((path, data));
        }

        assert_eq!(recovered.len(), 3);
        for ((name, data), (path, got)) in files.iter().zip(&recovered) {
            assert_eq!(path, &format!(".misc/{}", name));
            assert_eq!(got.as_slice(), *data);
        }
    }

    #[test]
    fn test_finalize_writes_tar_trailer_inside_gzip() {
        let (_scratch, temp) = finished_archive(&[("a.txt", &b"alpha"[..])], "txt");

        let mut tar_bytes = Vec::new();
        GzDecoder::new(File::open(&temp).unwrap())
            .read_to_end(&mut tar_bytes)
            .unwrap();

        // Header block + one data block + the two zero end-of-archive blocks.
        assert_eq!(tar_bytes.len() % 512, 0);
        assert!(tar_bytes.len() >= 4 * 512);
        assert!(tar_bytes[tar_bytes.len() - 1024..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_missing_gzip_trailer_is_detected() {
        let (_scratch, temp) = finished_archive(&[("a.txt", &b"alpha"[..])], "txt");
        let mut bytes = fs::read(&temp).unwrap();
        bytes.truncate(bytes.len() - 8); // Drop the gzip CRC32 + size trailer.

        let mut out = Vec::new();
        let result = GzDecoder::new(bytes.as_slice()).read_to_end(&mut out);
        assert!(result.is_err());
    }

    #[test]
    fn test_header_carries_size_and_mode() {
        let (_scratch, temp) = finished_archive(&[("data.csv", &b"1,2,3\n"[..])], ".csv");
        let mut archive = Archive::new(GzDecoder::new(File::open(&temp).unwrap()));
        let entry = archive.entries().unwrap().next().unwrap().unwrap();
        assert_eq!(entry.header().size().unwrap(), 6);
        assert_eq!(entry.header().entry_type(), EntryType::Regular);
        assert!(entry.header().mode().is_ok());
    }

    #[test]
    fn test_tar_discard_removes_temp_file() {
        let scratch = tempdir().unwrap();
        let backend: Box<dyn ArchiveBackend> =
            Box::new(TarGzBackend::open(scratch.path()).unwrap());
        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 1);
        backend.discard();
        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
    }
}
