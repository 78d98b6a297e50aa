//! Backfill mode: regenerate the CSV series from already-archived PDFs.
//!
//! Walks a directory tree of previously saved rate PDFs in path order and
//! runs each through the same extraction path as a live fetch, rebuilding
//! the per-currency CSV files. The novelty state is neither consulted nor
//! modified; backfill is a pure re-derivation of the CSV series.
//!
//! Files that fail to parse are logged and skipped so one corrupt archive
//! entry cannot block the rest of the sweep.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use crate::error::PersistenceError;
use crate::{extract, rates};

/// Collect every `*.pdf` under `dir`, sorted by path.
///
/// The dated directory layout means path order is chronological order, so
/// the CSV rows are appended oldest-first.
pub(crate) fn collect_pdfs(dir: &Path) -> Vec<PathBuf> {
    let mut pdfs: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .map(|entry| entry.into_path())
        .collect();
    pdfs.sort();
    pdfs
}

/// Re-parse every archived PDF under `pdf_dir` into the CSV series.
///
/// # Returns
///
/// The number of PDFs successfully parsed and merged. Parse failures are
/// skipped; only CSV write failures abort the sweep.
#[instrument(level = "info", skip_all, fields(pdf_dir = %pdf_dir.display()))]
pub fn run_backfill(pdf_dir: &Path, csv_dir: &Path) -> Result<usize, PersistenceError> {
    let pdfs = collect_pdfs(pdf_dir);
    info!(count = pdfs.len(), "Backfill starting");

    let mut processed = 0usize;
    for path in &pdfs {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable file; skipping");
                continue;
            }
        };
        let text = match extract::extract_text(&bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Text extraction failed; skipping");
                continue;
            }
        };
        let published_at = match extract::extract_publication_datetime(&text) {
            Ok(ts) => ts,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "No publication datetime; skipping");
                continue;
            }
        };
        let rows = rates::extract_reference_rates(&text);
        if rows.is_empty() {
            warn!(path = %path.display(), "No reference rates parsed; skipping");
            continue;
        }

        rates::append_rates(csv_dir, &rows, published_at, &path.display().to_string())?;
        processed += 1;
    }

    info!(processed, total = pdfs.len(), "Backfill complete");
    Ok(processed)
}
