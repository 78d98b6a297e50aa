//! Small helpers for directory validation and log formatting.

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut at `max` characters with an ellipsis and byte count
/// appended, so extracted document text can be previewed in logs without
/// flooding them.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}…(+{} bytes)", &s[..max], s.len() - max)
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then probes writability by creating and
/// deleting a throwaway file. Failing early here beats discovering a
/// read-only downloads directory after the fetch has already happened.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_strings_pass_through() {
        assert_eq!(truncate_for_log("Date: 05-08-2026", 100), "Date: 05-08-2026");
    }

    #[test]
    fn long_strings_are_cut_with_byte_count() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[tokio::test]
    async fn writable_dir_probe_succeeds_on_temp_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pdf_files");
        ensure_writable_dir(path.to_str().unwrap()).await.unwrap();
        assert!(path.is_dir());
    }
}
