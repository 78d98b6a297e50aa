//! Persistence of the download state, the lock, and the archived PDFs.
//!
//! The state file holds exactly one [`DownloadRecord`] as JSON. It is only
//! ever replaced atomically: the new record is serialized to a temp file in
//! the same directory, synced, and renamed over the old one, so a crash
//! mid-save can never leave a half-written record behind.
//!
//! Overlapping scheduler invocations are excluded with a lock file beside the
//! state file. The lock is created with `create_new` and removed when the
//! guard drops, on every exit path. A lock left behind by a killed run is
//! reported rather than stolen; the next scheduled run surfaces it again
//! until the operator removes it.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use crate::error::PersistenceError;
use crate::models::DownloadRecord;

/// Handle to the JSON state file recording the last saved download.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
}

/// Exclusive lock over the state file, released on drop.
#[derive(Debug)]
pub struct StateLock {
    path: PathBuf,
}

impl Drop for StateLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Acquire the exclusive lock guarding the decide-and-persist section.
    ///
    /// # Errors
    ///
    /// [`PersistenceError::Locked`] when another invocation already holds the
    /// lock; [`PersistenceError::Io`] on any other filesystem failure.
    pub fn lock(&self) -> Result<StateLock, PersistenceError> {
        let lock_path = self.path.with_extension("lock");
        ensure_parent_dir(&lock_path)?;

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(PersistenceError::Locked { path: lock_path });
            }
            Err(e) => return Err(PersistenceError::io(&lock_path, e)),
        };

        // The PID makes a stale lock attributable from the outside.
        let _ = writeln!(file, "{}", std::process::id());
        debug!(path = %lock_path.display(), "Acquired state lock");
        Ok(StateLock { path: lock_path })
    }

    /// Load the last persisted record.
    ///
    /// An absent state file means a first run and yields `Ok(None)`; a state
    /// file that exists but does not deserialize is an error.
    pub fn load(&self) -> Result<Option<DownloadRecord>, PersistenceError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistenceError::io(&self.path, e)),
        };

        let record = serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Json {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(record))
    }

    /// Atomically replace the persisted record.
    ///
    /// The record is written to a temp file in the state file's directory,
    /// synced to disk, and renamed into place.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub fn save(&self, record: &DownloadRecord) -> Result<(), PersistenceError> {
        let dir = ensure_parent_dir(&self.path)?;

        let json = serde_json::to_vec_pretty(record).map_err(|source| PersistenceError::Json {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp =
            NamedTempFile::new_in(&dir).map_err(|e| PersistenceError::io(&self.path, e))?;
        tmp.write_all(&json)
            .map_err(|e| PersistenceError::io(&self.path, e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| PersistenceError::io(&self.path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| PersistenceError::io(&self.path, e.error))?;

        info!(hash = %record.content_hash, published_at = %record.published_at, "Updated download record");
        Ok(())
    }
}

/// Write the artifact bytes to the downloads directory.
///
/// The file lands at `{pdf_dir}/{year}/{month}/{YYYY-MM-DD_HHMM}.pdf`, so a
/// plain directory listing sorts chronologically.
///
/// # Arguments
///
/// * `bytes` - Raw payload to archive
/// * `published_at` - Extracted publication time, or the fetch time when
///   extraction degraded
/// * `pdf_dir` - Root of the downloads directory
#[instrument(level = "info", skip_all, fields(pdf_dir = %pdf_dir.display(), %published_at))]
pub fn save_pdf(
    bytes: &[u8],
    published_at: NaiveDateTime,
    pdf_dir: &Path,
) -> Result<PathBuf, PersistenceError> {
    let dir = pdf_dir
        .join(published_at.year().to_string())
        .join(format!("{:02}", published_at.month()));
    fs::create_dir_all(&dir).map_err(|e| PersistenceError::io(&dir, e))?;

    let path = dir.join(format!("{}.pdf", published_at.format("%Y-%m-%d_%H%M")));
    fs::write(&path, bytes).map_err(|e| PersistenceError::io(&path, e))?;

    info!(path = %path.display(), bytes = bytes.len(), "Archived rates PDF");
    Ok(path)
}

/// Create the parent directory of `path` if needed, returning it.
fn ensure_parent_dir(path: &Path) -> Result<PathBuf, PersistenceError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| PersistenceError::io(&dir, e))?;
    Ok(dir)
}
