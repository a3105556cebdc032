//! Small helpers shared across the pipeline.
//!
//! - String truncation for log previews of upstream payloads
//! - JSON EOF detection, used to flag truncated completions
//! - Slugification for Markdown anchors
//! - Output directory validation

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (backing off to the nearest
/// character boundary) with an ellipsis and byte count appended.
///
/// # Arguments
///
/// * `s` - The string to truncate
/// * `max` - Maximum number of bytes kept before the ellipsis
///
/// # Returns
///
/// The original string if it fits, otherwise the cut prefix plus a suffix
/// naming how many bytes were dropped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// A completion cut off by the model's output limit fails with an EOF error
/// rather than a syntax error.
///
/// # Returns
///
/// `true` if the error category is `Eof`.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

/// Convert a title to a URL-friendly slug.
///
/// Lowercases, drops punctuation, and joins words with hyphens. Used for the
/// Markdown table of contents anchors.
///
/// ```ignore
/// assert_eq!(slugify_title("Hello World"), "hello-world");
/// ```
pub fn slugify_title(title: &str) -> String {
    title
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .replace(' ', "-")
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
///
/// # Arguments
///
/// * `path` - Directory to create and check
///
/// # Returns
///
/// * `Ok(())` - The directory exists and accepts new files
/// * `Err(_)` - It could not be created or written to
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
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
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        // 'é' is two bytes; cutting at 3 would split the second one.
        let result = truncate_for_log("éééé", 3);
        assert_eq!(result, "é…(+6 bytes)");
    }

    #[test]
    fn test_slugify_title() {
        assert_eq!(slugify_title("Hello World"), "hello-world");
        assert_eq!(slugify_title("Test-Article!"), "test-article");
        assert_eq!(slugify_title("Special@#$Characters"), "specialcharacters");
        assert_eq!(slugify_title("GPU's Next Gen"), "gpus-next-gen");
    }

    #[test]
    fn test_looks_truncated() {
        let result: Result<serde_json::Value, _> = serde_json::from_str(r#"[{"field": "value"#);
        assert!(looks_truncated(&result.unwrap_err()));

        let result: Result<serde_json::Value, _> = serde_json::from_str(r#"[{"field": }]"#);
        assert!(!looks_truncated(&result.unwrap_err()));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested");
        let path_str = path.to_str().unwrap();
        ensure_writable_dir(path_str).await.unwrap();
        assert!(path.is_dir());
        assert!(std::fs::read_dir(&path).unwrap().next().is_none());
    }
}
