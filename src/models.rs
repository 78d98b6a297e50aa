//! Data models for fetched artifacts and the persisted download state.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`FetchedArtifact`]: the raw PDF payload retrieved in this invocation
//! - [`DownloadRecord`]: persisted metadata describing the last saved download
//! - [`Novelty`]: the NEW/DUPLICATE classification of a fetched artifact
//! - [`CurrencyRates`]: one parsed reference-rate row from the rates table

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The raw PDF payload retrieved in one invocation.
///
/// Ephemeral: exists only for the duration of a single pipeline pass and is
/// never persisted as-is.
#[derive(Debug)]
pub struct FetchedArtifact {
    /// The raw response body.
    pub bytes: Vec<u8>,
    /// Local wall-clock time at which the download completed.
    pub retrieved_at: NaiveDateTime,
    /// The URL that actually served the payload (primary or fallback).
    pub source_url: String,
}

/// Persisted metadata describing the last saved download.
///
/// Exactly one record exists between invocations, stored as JSON in the state
/// file. It is created on the first successful run and atomically overwritten
/// on every NEW classification.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DownloadRecord {
    /// Lowercase hex SHA-256 of the saved payload bytes.
    pub content_hash: String,
    /// Publication timestamp extracted from the PDF, or the fetch time when
    /// extraction degraded.
    pub published_at: NaiveDateTime,
    /// Path of the saved PDF, relative to the working directory.
    pub saved_file: String,
}

/// Classification of a fetched artifact against the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Novelty {
    /// The artifact carries content not seen before; persist it.
    New,
    /// The artifact matches the last saved download; write nothing.
    Duplicate,
}

impl Novelty {
    /// Lowercase label for log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Novelty::New => "new",
            Novelty::Duplicate => "duplicate",
        }
    }
}

/// One parsed row of the reference-rates table.
///
/// `rates` keeps the column values as printed in the PDF (TT buy/sell, bill
/// buy/sell, travel card buy/sell, currency-note buy/sell).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyRates {
    /// Three-letter ISO currency code, e.g. `USD`.
    pub currency_code: String,
    /// Column values in table order, as printed.
    pub rates: Vec<String>,
}
