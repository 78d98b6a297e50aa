//! # fx_ratewatch
//!
//! A scheduled archiver for a bank's daily forex card-rates PDF. Each run
//! fetches the published document, decides whether its content is genuinely
//! new relative to the last saved version, and if so archives it under a
//! timestamped filename, updates the download record, and extends the
//! per-currency CSV series.
//!
//! ## Pipeline
//!
//! 1. **Fetch**: download the PDF from the primary URL, falling back to the
//!    alternate hostname
//! 2. **Fingerprint**: SHA-256 over the raw payload bytes
//! 3. **Extract**: publication date/time from the document text (recoverable
//!    on failure; the run degrades to hash-only comparison)
//! 4. **Decide**: NEW or DUPLICATE against the persisted download record
//! 5. **Persist**: on NEW, archive the PDF, atomically replace the record,
//!    and append the parsed rates to the CSV series
//!
//! The whole pipeline executes once per invocation; an external scheduler
//! (cron, systemd timer) provides the cadence and the retries. A non-zero
//! exit code signals a fetch or persistence failure.
//!
//! ## Usage
//!
//! ```sh
//! fx_ratewatch -p ./pdf_files -c ./csv_files
//! ```

use chrono::NaiveDateTime;
use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};
use url::Url;

mod backfill;
mod cli;
mod error;
mod extract;
mod fetch;
mod fingerprint;
mod models;
mod novelty;
mod rates;
mod store;
mod utils;

use cli::Cli;
use models::{DownloadRecord, Novelty};
use store::StateStore;
use utils::{ensure_writable_dir, truncate_for_log};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("ratewatch starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.url, ?args.pdf_output_dir, ?args.state_file, "Parsed CLI arguments");

    // Backfill mode bypasses the fetch pipeline and the novelty state.
    if let Some(dir) = &args.backfill {
        let processed =
            backfill::run_backfill(Path::new(dir), Path::new(&args.csv_output_dir))?;
        info!(processed, elapsed = ?start_time.elapsed(), "Backfill run finished");
        return Ok(());
    }

    // Early checks: configured URLs must parse, output dirs must be writable.
    Url::parse(&args.url)?;
    Url::parse(&args.fallback_url)?;
    ensure_writable_dir(&args.pdf_output_dir).await?;
    ensure_writable_dir(&args.csv_output_dir).await?;

    // ---- Fetch ----
    let candidates = [args.url.as_str(), args.fallback_url.as_str()];
    let artifact =
        fetch::fetch_rates_pdf(&candidates, Duration::from_secs(args.timeout_secs)).await?;
    info!(
        bytes = artifact.bytes.len(),
        url = %artifact.source_url,
        retrieved_at = %artifact.retrieved_at,
        "Fetched rates document"
    );

    // ---- Fingerprint and timestamp extraction (independent of each other) ----
    let new_hash = fingerprint::sha256_hex(&artifact.bytes);
    debug!(hash = %new_hash, "Computed content fingerprint");

    let text = match extract::extract_text(&artifact.bytes) {
        Ok(text) => {
            debug!(preview = %truncate_for_log(&text, 200), "Extracted document text");
            Some(text)
        }
        Err(e) => {
            warn!(error = %e, "Could not read document text; degrading to hash-only comparison");
            None
        }
    };
    let published_at: Option<NaiveDateTime> = match text.as_deref() {
        Some(text) => match extract::extract_publication_datetime(text) {
            Ok(ts) => {
                info!(published_at = %ts, "Extracted publication datetime");
                Some(ts)
            }
            Err(e) => {
                warn!(error = %e, "No publication datetime; degrading to hash-only comparison");
                None
            }
        },
        None => None,
    };

    // ---- Decide and persist, under the exclusive state lock ----
    let state = StateStore::new(&args.state_file);
    let _lock = state.lock()?;
    let previous = state.load()?;

    let outcome = novelty::classify(previous.as_ref(), &new_hash, published_at);
    match outcome {
        Novelty::Duplicate => {
            info!(outcome = outcome.as_str(), hash = %new_hash, "Content unchanged; nothing saved");
        }
        Novelty::New => {
            let effective_at = published_at.unwrap_or(artifact.retrieved_at);
            let saved = store::save_pdf(
                &artifact.bytes,
                effective_at,
                Path::new(&args.pdf_output_dir),
            )?;
            let record = DownloadRecord {
                content_hash: new_hash.clone(),
                published_at: effective_at,
                saved_file: saved.display().to_string(),
            };
            state.save(&record)?;
            info!(
                outcome = outcome.as_str(),
                hash = %new_hash,
                published_at = %effective_at,
                path = %saved.display(),
                "Saved new rates publication"
            );

            if let Some(text) = &text {
                let rows = rates::extract_reference_rates(text);
                if rows.is_empty() {
                    warn!("No reference rates parsed from document text");
                } else {
                    rates::append_rates(
                        Path::new(&args.csv_output_dir),
                        &rows,
                        effective_at,
                        &record.saved_file,
                    )?;
                }
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");

    Ok(())
}
