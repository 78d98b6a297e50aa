//! The NEW/DUPLICATE decision for a fetched artifact.
//!
//! An artifact is NEW when its content hash differs from the stored record,
//! or when its extracted publication timestamp is strictly later than the
//! stored one. The dual check covers two failure shapes on the publisher's
//! side: the PDF being regenerated byte-for-byte differently without a new
//! publication (hash changes, timestamp does not advance), and a stale hash
//! comparison when timestamp extraction failed on an earlier run.
//!
//! When extraction failed for the current artifact the comparison degrades to
//! hash-only; callers are expected to log that mode.

use chrono::NaiveDateTime;

use crate::models::{DownloadRecord, Novelty};

/// Classify a fetched artifact against the last persisted record.
///
/// # Arguments
///
/// * `previous` - The stored record, absent on the first run
/// * `new_hash` - Lowercase hex SHA-256 of the fetched payload
/// * `new_timestamp` - Publication timestamp from the PDF, `None` when
///   extraction degraded
///
/// # Returns
///
/// [`Novelty::New`] when the artifact should be persisted, otherwise
/// [`Novelty::Duplicate`]. With no prior record the answer is always NEW.
pub fn classify(
    previous: Option<&DownloadRecord>,
    new_hash: &str,
    new_timestamp: Option<NaiveDateTime>,
) -> Novelty {
    let Some(previous) = previous else {
        return Novelty::New;
    };

    if new_hash != previous.content_hash {
        return Novelty::New;
    }

    match new_timestamp {
        Some(ts) if ts > previous.published_at => Novelty::New,
        _ => Novelty::Duplicate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn record(hash: &str, published_at: NaiveDateTime) -> DownloadRecord {
        DownloadRecord {
            content_hash: hash.to_string(),
            published_at,
            saved_file: "pdf_files/2026/08/2026-08-04_0900.pdf".to_string(),
        }
    }

    #[test]
    fn first_run_is_always_new() {
        assert_eq!(classify(None, "aaaa", Some(ts(4, 9))), Novelty::New);
        assert_eq!(classify(None, "aaaa", None), Novelty::New);
    }

    #[test]
    fn same_hash_same_timestamp_is_duplicate() {
        let prev = record("aaaa", ts(4, 9));
        assert_eq!(classify(Some(&prev), "aaaa", Some(ts(4, 9))), Novelty::Duplicate);
    }

    #[test]
    fn differing_hash_is_new_regardless_of_timestamp_order() {
        let prev = record("aaaa", ts(4, 9));
        assert_eq!(classify(Some(&prev), "bbbb", Some(ts(5, 9))), Novelty::New);
        assert_eq!(classify(Some(&prev), "bbbb", Some(ts(4, 9))), Novelty::New);
        assert_eq!(classify(Some(&prev), "bbbb", Some(ts(3, 9))), Novelty::New);
    }

    #[test]
    fn same_hash_with_later_timestamp_is_new() {
        let prev = record("aaaa", ts(4, 9));
        assert_eq!(classify(Some(&prev), "aaaa", Some(ts(4, 13))), Novelty::New);
    }

    #[test]
    fn same_hash_with_earlier_timestamp_is_duplicate() {
        let prev = record("aaaa", ts(4, 9));
        assert_eq!(classify(Some(&prev), "aaaa", Some(ts(4, 8))), Novelty::Duplicate);
    }

    #[test]
    fn missing_timestamp_falls_back_to_hash_only() {
        let prev = record("aaaa", ts(4, 9));
        assert_eq!(classify(Some(&prev), "aaaa", None), Novelty::Duplicate);
        assert_eq!(classify(Some(&prev), "bbbb", None), Novelty::New);
    }
}
