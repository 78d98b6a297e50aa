//! Publication date/time extraction from the PDF text layer.
//!
//! The rates document carries its publication moment as two plain-text lines
//! near the top of the first page:
//!
//! ```text
//! Date: 05-08-2026
//! Time: 09:00 AM
//! ```
//!
//! The date is printed day-first. Spacing and separators drift between
//! editions (`05/08/2026`, `Date :05-08-26`, a 24-hour clock without a
//! meridiem), so parsing is pattern-based rather than positional. Failure
//! here is recoverable: the caller falls back to hash-only novelty detection.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

use crate::error::ExtractionError;

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})[-/.](\d{1,2})[-/.](\d{2,4})").unwrap());

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2}):(\d{2})(?::\d{2})?\s*(AM|PM)?").unwrap());

/// Decode the text layer of a PDF payload.
#[instrument(level = "debug", skip_all, fields(bytes = bytes.len()))]
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = pdf_extract::extract_text_from_mem(bytes)?;
    debug!(chars = text.len(), "Extracted PDF text layer");
    Ok(text)
}

/// Parse the publication date and time out of extracted document text.
///
/// Scans for the first line starting with `Date` and the first starting with
/// `Time` (case-insensitive), then parses each with a tolerant pattern.
///
/// # Errors
///
/// Returns a typed [`ExtractionError`] when either line is missing or does
/// not contain a parsable value. Never panics on malformed input.
pub fn extract_publication_datetime(text: &str) -> Result<NaiveDateTime, ExtractionError> {
    let date_line = text
        .lines()
        .find(|line| line.trim().to_lowercase().starts_with("date"))
        .ok_or(ExtractionError::DateLineMissing)?;
    let time_line = text
        .lines()
        .find(|line| line.trim().to_lowercase().starts_with("time"))
        .ok_or(ExtractionError::TimeLineMissing)?;

    let date = parse_date_line(date_line)?;
    let time = parse_time_line(time_line)?;
    Ok(NaiveDateTime::new(date, time))
}

/// Parse a day-first date from a `Date: ...` line.
///
/// Two-digit years are taken as 2000-based. A day/month pair where both
/// values are 12 or less is ambiguous on paper; the source prints day-first,
/// so that order wins, with the ambiguity noted at debug level.
fn parse_date_line(line: &str) -> Result<NaiveDate, ExtractionError> {
    let captures = DATE_RE.captures(line).ok_or_else(|| ExtractionError::BadDate {
        line: line.trim().to_string(),
    })?;

    // Captured digit groups always parse; range errors surface below.
    let day: u32 = captures[1].parse().unwrap_or(0);
    let month: u32 = captures[2].parse().unwrap_or(0);
    let mut year: i32 = captures[3].parse().unwrap_or(0);
    if year < 100 {
        year += 2000;
    }

    if day <= 12 && month <= 12 && day != month {
        debug!(%day, %month, line = line.trim(), "Ambiguous day/month pair; reading day-first");
    }

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| ExtractionError::BadDate {
        line: line.trim().to_string(),
    })
}

/// Parse a wall-clock time from a `Time: ...` line, 12-hour or 24-hour.
fn parse_time_line(line: &str) -> Result<NaiveTime, ExtractionError> {
    let captures = TIME_RE.captures(line).ok_or_else(|| ExtractionError::BadTime {
        line: line.trim().to_string(),
    })?;

    let mut hour: u32 = captures[1].parse().unwrap_or(0);
    let minute: u32 = captures[2].parse().unwrap_or(0);

    let meridiem = captures.get(3).map(|m| m.as_str().to_ascii_uppercase());
    match meridiem.as_deref() {
        Some("PM") if hour != 12 => hour += 12,
        Some("AM") if hour == 12 => hour = 0,
        _ => {}
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| ExtractionError::BadTime {
        line: line.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn parses_the_standard_layout() {
        let text = "FOREX CARD RATES\nDate: 05-08-2026\nTime: 09:00 AM\nCURRENCY ...";
        assert_eq!(
            extract_publication_datetime(text).unwrap(),
            dt(2026, 8, 5, 9, 0)
        );
    }

    #[test]
    fn parses_afternoon_times() {
        let text = "Date: 05-08-2026\nTime: 01:30 PM";
        assert_eq!(
            extract_publication_datetime(text).unwrap(),
            dt(2026, 8, 5, 13, 30)
        );
    }

    #[test]
    fn noon_and_midnight_meridiem_handling() {
        let noon = "Date: 05-08-2026\nTime: 12:00 PM";
        assert_eq!(extract_publication_datetime(noon).unwrap(), dt(2026, 8, 5, 12, 0));

        let midnight = "Date: 05-08-2026\nTime: 12:05 AM";
        assert_eq!(
            extract_publication_datetime(midnight).unwrap(),
            dt(2026, 8, 5, 0, 5)
        );
    }

    #[test]
    fn tolerates_separator_and_spacing_drift() {
        let text = "  DATE :05/08/26\n  TIME :  14:15:30  ";
        assert_eq!(
            extract_publication_datetime(text).unwrap(),
            dt(2026, 8, 5, 14, 15)
        );
    }

    #[test]
    fn day_first_order_wins_for_ambiguous_dates() {
        let text = "Date: 03-04-2026\nTime: 09:00 AM";
        // 3 April, not March 4.
        assert_eq!(
            extract_publication_datetime(text).unwrap(),
            dt(2026, 4, 3, 9, 0)
        );
    }

    #[test]
    fn missing_date_line_is_a_typed_error() {
        let text = "FOREX CARD RATES\nTime: 09:00 AM";
        assert!(matches!(
            extract_publication_datetime(text),
            Err(ExtractionError::DateLineMissing)
        ));
    }

    #[test]
    fn missing_time_line_is_a_typed_error() {
        let text = "Date: 05-08-2026\nCURRENCY TT BUY";
        assert!(matches!(
            extract_publication_datetime(text),
            Err(ExtractionError::TimeLineMissing)
        ));
    }

    #[test]
    fn garbled_date_is_a_typed_error() {
        let text = "Date: not printed today\nTime: 09:00 AM";
        assert!(matches!(
            extract_publication_datetime(text),
            Err(ExtractionError::BadDate { .. })
        ));
    }

    #[test]
    fn impossible_calendar_date_is_rejected() {
        let text = "Date: 32-08-2026\nTime: 09:00 AM";
        assert!(matches!(
            extract_publication_datetime(text),
            Err(ExtractionError::BadDate { .. })
        ));
    }

    #[test]
    fn garbled_time_is_a_typed_error() {
        let text = "Date: 05-08-2026\nTime: morning";
        assert!(matches!(
            extract_publication_datetime(text),
            Err(ExtractionError::BadTime { .. })
        ));
    }
}
