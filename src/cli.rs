//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option has a sensible default so a bare invocation from a scheduler
//! entry works; the URL options can also be provided via environment
//! variables.

use clap::Parser;

use crate::fetch::{SBI_DAILY_RATES_URL, SBI_DAILY_RATES_URL_FALLBACK};

/// Command-line arguments for the rates archiver.
///
/// # Examples
///
/// ```sh
/// # Scheduled run with the default layout
/// fx_ratewatch
///
/// # Custom locations
/// fx_ratewatch -p ./archive/pdfs -c ./archive/csv --state-file ./archive/state.json
///
/// # Rebuild the CSV series from already-archived PDFs
/// fx_ratewatch --backfill ./archive/pdfs
/// ```
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// URL of the daily rates PDF
    #[arg(long, env = "FX_RATES_URL", default_value = SBI_DAILY_RATES_URL)]
    pub url: String,

    /// Fallback URL tried when the primary fails
    #[arg(long, env = "FX_RATES_FALLBACK_URL", default_value = SBI_DAILY_RATES_URL_FALLBACK)]
    pub fallback_url: String,

    /// Output directory for archived PDFs
    #[arg(short, long, default_value = "pdf_files")]
    pub pdf_output_dir: String,

    /// Output directory for the per-currency CSV series
    #[arg(short, long, default_value = "csv_files")]
    pub csv_output_dir: String,

    /// Path of the JSON state file recording the last saved download
    #[arg(long, default_value = "state/last_download.json")]
    pub state_file: String,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Re-parse archived PDFs under this directory instead of fetching
    #[arg(long, value_name = "DIR")]
    pub backfill: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_arguments() {
        let cli = Cli::parse_from(["fx_ratewatch"]);

        assert_eq!(cli.url, SBI_DAILY_RATES_URL);
        assert_eq!(cli.fallback_url, SBI_DAILY_RATES_URL_FALLBACK);
        assert_eq!(cli.pdf_output_dir, "pdf_files");
        assert_eq!(cli.csv_output_dir, "csv_files");
        assert_eq!(cli.state_file, "state/last_download.json");
        assert_eq!(cli.timeout_secs, 10);
        assert!(cli.backfill.is_none());
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from(["fx_ratewatch", "-p", "/tmp/pdfs", "-c", "/tmp/csv"]);

        assert_eq!(cli.pdf_output_dir, "/tmp/pdfs");
        assert_eq!(cli.csv_output_dir, "/tmp/csv");
    }

    #[test]
    fn test_backfill_mode_flag() {
        let cli = Cli::parse_from(["fx_ratewatch", "--backfill", "./archive/pdfs"]);

        assert_eq!(cli.backfill.as_deref(), Some("./archive/pdfs"));
    }
}
