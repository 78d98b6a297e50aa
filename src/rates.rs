//! Reference-rate table extraction and the per-currency CSV series.
//!
//! Beyond archiving the PDF itself, each NEW publication gets its rates table
//! parsed into one CSV file per currency, so the history of any single
//! currency is a flat, append-only series:
//!
//! ```text
//! csv_files/
//! ├── REFERENCE_RATES_USD.csv
//! ├── REFERENCE_RATES_EUR.csv
//! └── ...
//! ```
//!
//! Rows are keyed by publication datetime; re-processing the same document
//! (a backfill pass over already-ingested PDFs, say) replaces the row instead
//! of duplicating it, and the series is kept sorted on every rewrite.
//!
//! Values never contain commas or quotes (rates are plain decimals, the date
//! column is `YYYY-MM-DD HH:MM`), which keeps the CSV handling line-based.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument};

use crate::error::PersistenceError;
use crate::models::CurrencyRates;

/// Phrase identifying the page that carries the authoritative rates table.
pub const REFERENCE_MARKER: &str = "to be used as reference rates";

/// Header row shared by every per-currency CSV file.
pub const CSV_HEADER: &str = "DATE,PDF FILE,TT BUY,TT SELL,BILL BUY,BILL SELL,\
FOREX TRAVEL CARD BUY,FOREX TRAVEL CARD SELL,CN BUY,CN SELL";

/// Format of the DATE column; lexicographic order equals chronological order.
pub const DATE_COLUMN_FORMAT: &str = "%Y-%m-%d %H:%M";

// The text layer sometimes drops the space between the currency pair and the
// first rate, so \s* rather than \s+ after the pair.
static RATE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]{3})/INR\s*((?:\d+(?:\.\d+)?\s?)+)").unwrap());

/// Parse the per-currency rate rows out of extracted document text.
///
/// Returns an empty vector when the text does not contain the
/// reference-rates marker phrase; callers treat that as a logged warning,
/// never a fatal error.
pub fn extract_reference_rates(text: &str) -> Vec<CurrencyRates> {
    if !text.to_lowercase().contains(REFERENCE_MARKER) {
        debug!("Reference-rates marker not found in document text");
        return Vec::new();
    }

    let mut rows = Vec::new();
    for line in text.lines() {
        if let Some(captures) = RATE_LINE_RE.captures(line) {
            rows.push(CurrencyRates {
                currency_code: captures[1].to_string(),
                rates: captures[2].split_whitespace().map(str::to_string).collect(),
            });
        }
    }

    debug!(count = rows.len(), "Parsed reference-rate rows");
    rows
}

/// Append one publication's rows to the per-currency CSV series.
///
/// Each currency's file is read back, the new row merged in keyed by its
/// DATE column (latest wins), and the file rewritten sorted.
///
/// # Arguments
///
/// * `csv_dir` - Root of the CSV series directory
/// * `rows` - Parsed rate rows for this publication
/// * `published_at` - Publication datetime, used as the row key
/// * `pdf_file` - Path of the archived PDF this row came from
#[instrument(level = "info", skip_all, fields(csv_dir = %csv_dir.display(), currencies = rows.len()))]
pub fn append_rates(
    csv_dir: &Path,
    rows: &[CurrencyRates],
    published_at: NaiveDateTime,
    pdf_file: &str,
) -> Result<(), PersistenceError> {
    fs::create_dir_all(csv_dir).map_err(|e| PersistenceError::io(csv_dir, e))?;

    let date_column = published_at.format(DATE_COLUMN_FORMAT).to_string();
    for row in rows {
        let path = csv_dir.join(format!("REFERENCE_RATES_{}.csv", row.currency_code));

        let mut by_date: BTreeMap<String, String> = BTreeMap::new();
        match fs::read_to_string(&path) {
            Ok(existing) => {
                for line in existing.lines().skip(1).filter(|l| !l.is_empty()) {
                    if let Some((date, _)) = line.split_once(',') {
                        by_date.insert(date.to_string(), line.to_string());
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(PersistenceError::io(&path, e)),
        }

        let line = format!("{},{},{}", date_column, pdf_file, row.rates.join(","));
        by_date.insert(date_column.clone(), line);

        let mut out = String::with_capacity(by_date.len() * 96);
        out.push_str(CSV_HEADER);
        out.push('\n');
        for line in by_date.values() {
            out.push_str(line);
            out.push('\n');
        }
        fs::write(&path, out).map_err(|e| PersistenceError::io(&path, e))?;
    }

    info!(currencies = rows.len(), date = %date_column, "Updated CSV series");
    Ok(())
}
