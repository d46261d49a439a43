//! # Squeeze Archive Entries (`common::archive::entry`)
//!
//! File: cli/src/common/archive/entry.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! An entry exists only for the duration of one write: an archive-relative
//! name plus an open source file. This module builds both halves and hands them
//! to a backend.
//!
//! ## Naming
//!
//! Every backend uses `entry_name`, so zip and tar.gz archives lay out files
//! identically: `<group key>/<base name>`, or just `<base name>` when the key is
//! empty. The key is sanitized: it is split on `/` and `\`, empty, `.` and `..`
//! components are dropped, and the rest are rejoined with `/`. A key can never
//! escape the archive root or produce a leading slash.
//!
//! ## Failure classification
//!
//! `EntrySource` implements `Read` and remembers whether a read failed. When a
//! backend's copy fails, `EntrySource::failure` turns the error into
//! `SqueezeError::Io` (the source could not be read) or `SqueezeError::Write`
//! (the archive writer failed).
//!
use super::ArchiveBackend;
use crate::core::error::{Result, SqueezeError};
use anyhow::anyhow;
use std::fs::{File, Metadata};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read buffer size used when streaming a source file into an entry.
pub const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Builds the archive-relative entry name for a file in group `group_key`.
pub fn entry_name(group_key: &str, base_name: &str) -> String {
    let prefix = sanitize_prefix(group_key);
    if prefix.is_empty() {
        base_name.to_string()
    } else {
        format!("{}/{}", prefix, base_name)
    }
}

fn sanitize_prefix(group_key: &str) -> String {
    group_key
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .collect::<Vec<_>>()
        .join("/")
}

/// An open source file on its way into the archive.
pub struct EntrySource {
    path: PathBuf,
    base_name: String,
    metadata: Metadata,
    reader: BufReader<File>,
    bytes_read: u64,
    read_failed: bool,
}

impl EntrySource {
    /// Opens `path` for reading and captures its metadata.
    ///
    /// # Errors
    ///
    /// Returns `SqueezeError::Io` if the file cannot be opened or stat-ed, or
    /// if the path has no file name component.
    pub fn open(path: &Path) -> Result<Self> {
        let io_err = |source: io::Error| {
            anyhow!(SqueezeError::Io {
                path: path.to_path_buf(),
                source,
            })
        };

        let base_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                io_err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "path has no file name",
                ))
            })?;
        let file = File::open(path).map_err(io_err)?;
        let metadata = file.metadata().map_err(io_err)?;

        Ok(Self {
            path: path.to_path_buf(),
            base_name,
            metadata,
            reader: BufReader::with_capacity(COPY_BUFFER_SIZE, file),
            bytes_read: 0,
            read_failed: false,
        })
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Size reported by the filesystem when the source was opened.
    pub fn len(&self) -> u64 {
        self.metadata.len()
    }

    /// Bytes handed out through `Read` so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Unix permission bits of the source, when the platform has them.
    pub fn unix_mode(&self) -> Option<u32> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            Some(self.metadata.permissions().mode() & 0o7777)
        }
        #[cfg(not(unix))]
        {
            None
        }
    }

    /// Classifies a failed entry write as a read or a write failure.
    pub fn failure(&self, entry: &str, err: impl std::fmt::Display) -> anyhow::Error {
        if self.read_failed {
            anyhow!(SqueezeError::Io {
                path: self.path.clone(),
                source: io::Error::new(io::ErrorKind::Other, err.to_string()),
            })
        } else {
            anyhow!(SqueezeError::Write {
                entry: entry.to_string(),
                reason: err.to_string(),
            })
        }
    }

    /// Fails if fewer or more bytes were read than the size captured at open.
    ///
    /// Formats with a size in the entry header (tar) are corrupt if the file
    /// changed size while it was being copied.
    pub fn ensure_fully_read(&self) -> Result<()> {
        if self.bytes_read != self.len() {
            return Err(anyhow!(SqueezeError::Io {
                path: self.path.clone(),
                source: io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "file changed size while archiving (expected {} bytes, read {})",
                        self.len(),
                        self.bytes_read
                    ),
                ),
            }));
        }
        Ok(())
    }
}

impl Read for EntrySource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reader.read(buf) {
            Ok(n) => {
                self.bytes_read += n as u64;
                Ok(n)
            }
            Err(e) => {
                if e.kind() != io::ErrorKind::Interrupted {
                    self.read_failed = true;
                }
                Err(e)
            }
        }
    }
}

/// Writes the file at `path` into `backend` as an entry of group `group_key`.
///
/// Returns the entry name that was written.
pub fn write_entry(backend: &mut dyn ArchiveBackend, group_key: &str, path: &Path) -> Result<String> {
    let mut source = EntrySource::open(path)?;
    let name = entry_name(group_key, source.base_name());
    backend.write_entry(&name, &mut source)?;
    debug!(
        "Archived {} as '{}' ({} bytes)",
        path.display(),
        name,
        source.bytes_read()
    );
    Ok(name)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::kind_of;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_entry_name_with_and_without_prefix() {
        assert_eq!(entry_name("txt", "a.txt"), "txt/a.txt");
        assert_eq!(entry_name(".csv", "report.csv"), ".csv/report.csv");
        assert_eq!(entry_name("", "a.txt"), "a.txt");
    }

    #[test]
    fn test_entry_name_sanitizes_prefix() {
        assert_eq!(entry_name("../../etc", "passwd"), "etc/passwd");
        assert_eq!(entry_name("/abs/key/", "f"), "abs/key/f");
        assert_eq!(entry_name("a\\b", "f"), "a/b/f");
        assert_eq!(entry_name("./.", "f"), "f");
        assert_eq!(entry_name("..", "f"), "f");
    }

    #[test]
    fn test_open_reads_metadata_and_counts_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.bin");
        fs::write(&path, vec![7u8; 1000]).unwrap();

        let mut source = EntrySource::open(&path).unwrap();
        assert_eq!(source.base_name(), "data.bin");
        assert_eq!(source.len(), 1000);
        assert!(source.ensure_fully_read().is_err());

        let mut sink = Vec::new();
        io::copy(&mut source, &mut sink).unwrap();
        assert_eq!(sink.len(), 1000);
        assert_eq!(source.bytes_read(), 1000);
        assert!(source.ensure_fully_read().is_ok());
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = EntrySource::open(&dir.path().join("missing.txt")).err().unwrap();
        assert!(matches!(kind_of(&err), Some(SqueezeError::Io { .. })));
    }

    #[test]
    fn test_failure_classification_defaults_to_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "abc").unwrap();
        let source = EntrySource::open(&path).unwrap();

        let err = source.failure("txt/a.txt", "disk full");
        match kind_of(&err) {
            Some(SqueezeError::Write { entry, reason }) => {
                assert_eq!(entry, "txt/a.txt");
                assert_eq!(reason, "disk full");
            }
            other => panic!("unexpected error kind: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_mode_is_captured() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.sh");
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o750)).unwrap();
        let source = EntrySource::open(&path).unwrap();
        assert_eq!(source.unix_mode(), Some(0o750));
    }
}
