//! HTTP retrieval of the daily rates PDF.
//!
//! The bank publishes the same document behind two hostnames; the primary URL
//! is tried first and the fallback only when the primary fails. Each URL gets
//! exactly one attempt per invocation. There is deliberately no retry loop
//! here: the external scheduler re-runs the whole program on its own cadence,
//! and each of those runs is an independent retry.
//!
//! A response only counts as a success when the body starts with the `%PDF-`
//! magic header. The bank's CDN occasionally serves an HTML error page with a
//! 200 status, which would otherwise poison the archive.

use std::time::Duration;

use chrono::Local;
use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::error::FetchError;
use crate::models::FetchedArtifact;

/// Primary location of the daily forex card-rates PDF.
pub const SBI_DAILY_RATES_URL: &str =
    "https://www.sbi.co.in/documents/16012/1400784/FOREX_CARD_RATES.pdf";

/// Fallback location behind the bank's alternate hostname.
pub const SBI_DAILY_RATES_URL_FALLBACK: &str =
    "https://bank.sbi/documents/16012/1400784/FOREX_CARD_RATES.pdf";

/// True when `bytes` carries the PDF magic header.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

/// Download the rates PDF, trying each candidate URL once in order.
///
/// # Arguments
///
/// * `urls` - Candidate URLs, primary first
/// * `timeout` - Per-request timeout
///
/// # Returns
///
/// The first successfully fetched [`FetchedArtifact`], or the error from the
/// last attempted URL when every candidate fails.
#[instrument(level = "info", skip_all, fields(candidates = urls.len()))]
pub async fn fetch_rates_pdf(
    urls: &[&str],
    timeout: Duration,
) -> Result<FetchedArtifact, FetchError> {
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| FetchError::Client { source })?;

    let mut last_error = None;
    for url in urls {
        match fetch_one(&client, url).await {
            Ok(artifact) => return Ok(artifact),
            Err(e) => {
                warn!(%url, error = %e, "Fetch attempt failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or(FetchError::Exhausted))
}

/// Fetch a single URL and validate the payload.
#[instrument(level = "info", skip_all, fields(%url))]
async fn fetch_one(client: &Client, url: &str) -> Result<FetchedArtifact, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let bytes = response.bytes().await.map_err(|source| FetchError::Http {
        url: url.to_string(),
        source,
    })?;

    if !looks_like_pdf(&bytes) {
        return Err(FetchError::NotPdf {
            url: url.to_string(),
        });
    }

    info!(bytes = bytes.len(), "Downloaded rates PDF");
    Ok(FetchedArtifact {
        bytes: bytes.to_vec(),
        retrieved_at: Local::now().naive_local(),
        source_url: url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_magic_is_recognized() {
        assert!(looks_like_pdf(b"%PDF-1.7 rest of document"));
        assert!(looks_like_pdf(b"%PDF-"));
    }

    #[test]
    fn non_pdf_bodies_are_rejected() {
        assert!(!looks_like_pdf(b"<html><body>503</body></html>"));
        assert!(!looks_like_pdf(b""));
        assert!(!looks_like_pdf(b"%PDF"));
    }
}
