//! Persisted cluster version marker
//!
//! A store records a single version in its directory, in the textual form
//! `MAJOR.MINOR[.PATCH][-UNSTABLE]` followed by a newline. The same value is
//! the store's format marker and the cluster's active version marker.
//!
//! # Crash Safety
//!
//! Writes follow the write-fsync-rename pattern:
//! 1. Write to a temporary file (`.<marker>.tmp`)
//! 2. fsync the temporary file
//! 3. Atomic rename over the marker
//! 4. fsync the parent directory
//!
//! A reader therefore sees either the old marker or the new one, never a
//! torn write.

use crate::error::StartupError;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use strata_core::Version;

/// Handle to a store's version marker file
#[derive(Debug, Clone)]
pub struct StoreVersionMarker {
    dir: PathBuf,
    path: PathBuf,
}

impl StoreVersionMarker {
    /// Marker `file_name` inside store directory `dir`
    pub fn new(dir: impl AsRef<Path>, file_name: &str) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(file_name);
        StoreVersionMarker { dir, path }
    }

    /// Store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Marker file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether the marker exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the recorded version
    ///
    /// Returns `Ok(None)` if there is no marker. One trailing line ending
    /// (`\n` or `\r\n`) is accepted.
    pub fn read(&self) -> Result<Option<Version>, StartupError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(StartupError::MarkerNotText {
                    path: self.path.clone(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let text = contents.strip_suffix('\n').unwrap_or(&contents);
        let text = text.strip_suffix('\r').unwrap_or(text);
        text.parse::<Version>()
            .map(Some)
            .map_err(|source| StartupError::InvalidMarker {
                path: self.path.clone(),
                source,
            })
    }

    /// Atomically replace the recorded version
    pub fn write(&self, version: Version) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = self.dir.join(format!(".{}.tmp", file_name));

        // Step 1: Write to temporary file
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&temp_path)?;
        writeln!(file, "{}", version)?;

        // Step 2: fsync the file
        file.sync_all()?;
        drop(file);

        // Step 3: Atomic rename
        std::fs::rename(&temp_path, &self.path)?;

        // Step 4: fsync parent directory
        let dir = File::open(&self.dir)?;
        dir.sync_all()?;

        Ok(())
    }
}
