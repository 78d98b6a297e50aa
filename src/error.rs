//! Error types for the download pipeline.
//!
//! Errors are split along the pipeline's recovery boundaries:
//!
//! - [`FetchError`]: the HTTP retrieval failed. Fatal; the run exits non-zero
//!   and the external scheduler provides the retry.
//! - [`ExtractionError`]: the publication date/time could not be read from
//!   the PDF text. Recoverable; the pipeline falls back to hash-only novelty
//!   detection.
//! - [`PersistenceError`]: a filesystem, serialization, or lock failure while
//!   saving the artifact or its metadata. Fatal.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while retrieving the rates PDF over HTTP.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client itself could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// Transport-level failure (DNS, connect, timeout, body read).
    #[error("request to {url} failed: {source}")]
    Http {
        /// URL that was being fetched.
        url: String,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// URL that was being fetched.
        url: String,
        /// Status code from the response.
        status: reqwest::StatusCode,
    },
    /// The response body does not carry the PDF magic header.
    #[error("{url} returned a body that is not a PDF")]
    NotPdf {
        /// URL that was being fetched.
        url: String,
    },
    /// Every configured URL was tried and none produced a valid PDF.
    #[error("no configured URL produced a valid PDF")]
    Exhausted,
}

/// Failure while extracting the publication date/time from the PDF.
///
/// These never abort the run on their own; callers log the degraded mode and
/// continue with hash-only comparison.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The PDF text layer could not be decoded at all.
    #[error("failed to extract PDF text: {source}")]
    Pdf {
        /// Underlying pdf-extract error.
        #[from]
        source: pdf_extract::OutputError,
    },
    /// No line starting with "Date" was found in the document text.
    #[error("no date line found in document text")]
    DateLineMissing,
    /// No line starting with "Time" was found in the document text.
    #[error("no time line found in document text")]
    TimeLineMissing,
    /// A date line was found but did not contain a parsable date.
    #[error("could not parse a date from {line:?}")]
    BadDate {
        /// The offending line.
        line: String,
    },
    /// A time line was found but did not contain a parsable time.
    #[error("could not parse a time from {line:?}")]
    BadTime {
        /// The offending line.
        line: String,
    },
}

/// Failure while persisting the artifact, its metadata, or the CSV series.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem failure.
    #[error("filesystem error on {path}: {source}")]
    Io {
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The state file exists but does not deserialize.
    #[error("state file {path} is not a valid download record: {source}")]
    Json {
        /// Path of the state file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Another invocation holds the exclusive lock.
    #[error("another run holds the lock at {path}")]
    Locked {
        /// Path of the lock file.
        path: PathBuf,
    },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn io_helper_builds_variant_with_source() {
        let err = PersistenceError::io("state.json", io::Error::other("disk full"));
        assert!(matches!(err, PersistenceError::Io { .. }));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("state.json"));
    }

    #[test]
    fn locked_message_names_the_lock_path() {
        let err = PersistenceError::Locked {
            path: PathBuf::from("state/last_download.lock"),
        };
        assert!(err.to_string().contains("last_download.lock"));
    }
}
