//! # Project Memory Utilities
//!
//! Common helpers for hashing, date formatting and text layout.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of content string
///
/// # Examples
///
/// ```
/// use utils::compute_content_hash;
///
/// let hash = compute_content_hash("hello world");
/// assert_eq!(hash.len(), 64);
/// ```
#[must_use]
pub fn compute_content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Calendar date in `YYYY-MM-DD` form (UTC).
#[must_use]
pub fn format_date(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d").to_string()
}

/// Zero-based index of the last line of `content`, where the cursor lands
/// after revealing the end of the document.
#[must_use]
pub fn last_line_index(content: &str) -> usize {
    content.split('\n').count() - 1
}

/// Human-readable byte size.
#[must_use]
pub fn format_size(bytes: usize) -> String {
    match bytes {
        0..1024 => format!("{bytes} B"),
        1024..1_048_576 => format!("{:.1} KiB", bytes as f64 / 1024.0),
        _ => format!("{:.1} MiB", bytes as f64 / 1_048_576.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_compute_content_hash_consistency() {
        let content = "test content";
        let hash1 = compute_content_hash(content);
        let hash2 = compute_content_hash(content);
        assert_eq!(hash1, hash2);
        assert_ne!(hash1, compute_content_hash("other content"));
    }

    #[test]
    fn test_format_date_is_zero_padded() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 7, 23, 59, 59).unwrap();
        assert_eq!(format_date(instant), "2026-03-07");
    }

    #[test]
    fn test_last_line_index() {
        assert_eq!(last_line_index(""), 0);
        assert_eq!(last_line_index("a"), 0);
        assert_eq!(last_line_index("a\n"), 1);
        assert_eq!(last_line_index("# T\n\n## d\n- \n"), 4);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.0 KiB");
    }
}
