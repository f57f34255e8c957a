//! Small helpers for text shortening and output paths.

use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Shorten `s` to at most `max` characters, ending in `...` when cut.
///
/// Works on characters, not bytes, so multi-byte titles are never split
/// mid-character.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(snippet("short", 10), "short");
/// assert_eq!(snippet("abcdefghij", 8), "abcde...");
/// ```
pub fn snippet(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` bytes (backing off to a character
/// boundary) with a `"…(+N bytes)"` suffix.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Ensure the directory that will hold `file` exists and is writable.
///
/// Creates missing directories, then probes with a throwaway file.
#[instrument(level = "info", skip_all, fields(path = %file.display()))]
pub async fn ensure_parent_writable(file: &Path) -> Result<(), Box<dyn Error>> {
    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&dir).await?;

    let probe_path = dir.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!(dir = %dir.display(), "Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_short_string_unchanged() {
        assert_eq!(snippet("Hello, world!", 120), "Hello, world!");
        assert_eq!(snippet("", 5), "");
    }

    #[test]
    fn test_snippet_long_string() {
        let s = "a".repeat(200);
        let result = snippet(&s, 120);
        assert_eq!(result.chars().count(), 120);
        assert!(result.ends_with("..."));
        assert!(result.starts_with(&"a".repeat(117)));
    }

    #[test]
    fn test_snippet_multibyte() {
        assert_eq!(snippet("ééééé", 4), "é...");
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 100), "short");
        let long = "a".repeat(500);
        let result = truncate_for_log(&long, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
        // 'é' is two bytes; cutting at 1 must back off to 0.
        assert_eq!(truncate_for_log("éa", 1), "…(+3 bytes)");
    }

    #[tokio::test]
    async fn test_ensure_parent_writable_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("out").join("deeper").join("index.html");
        ensure_parent_writable(&file).await.unwrap();
        assert!(file.parent().unwrap().is_dir());
        assert!(!file.parent().unwrap().join("..__probe_write__").exists());
    }
}
