//! Utility functions for snapshot loading, text normalization, and digests.

use crate::error::Result;
use encoding_rs::{UTF_16BE, UTF_16LE};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Replaces every control character in a line with `?` and strips
/// surrounding whitespace.
///
/// Registry exports occasionally carry stray control bytes (NUL padding,
/// vertical tabs) that would corrupt downstream text processing, so each is
/// squashed to a visible placeholder before parsing.
pub fn normalize_line(line: &str) -> String {
    line.trim()
        .chars()
        .map(|c| if c.is_control() { '?' } else { c })
        .collect()
}

/// Decodes raw snapshot bytes into a normalized text stream.
///
/// Regedit exports are typically UTF-16LE with a BOM; older tools emit
/// plain ANSI/UTF-8. The BOM is inspected to pick the decoding, and any
/// invalid sequences are replaced rather than rejected, matching the
/// parser's tolerance for malformed content.
pub fn decode_snapshot_text(raw: &[u8]) -> String {
    if raw.starts_with(&[0xFF, 0xFE]) {
        let (decoded, _, _) = UTF_16LE.decode(raw);
        decoded.into_owned()
    } else if raw.starts_with(&[0xFE, 0xFF]) {
        let (decoded, _, _) = UTF_16BE.decode(raw);
        decoded.into_owned()
    } else {
        String::from_utf8_lossy(raw)
            .trim_start_matches('\u{feff}')
            .to_string()
    }
}

/// Reads a snapshot file and decodes it into text.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_snapshot_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let raw = fs::read(path)?;
    Ok(decode_snapshot_text(&raw))
}

/// Computes the hex-encoded SHA-256 digest of a file's contents.
///
/// Used for the provenance fields of a diff document.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_digest_hex<P: AsRef<Path>>(path: P) -> Result<String> {
    let raw = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&raw);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_line_trims() {
        assert_eq!(normalize_line("  \"Ver\"=\"1.0\"  "), "\"Ver\"=\"1.0\"");
    }

    #[test]
    fn test_normalize_line_control_chars() {
        assert_eq!(normalize_line("a\u{1}b\u{7f}c"), "a?b?c");
    }

    #[test]
    fn test_decode_utf8_plain() {
        assert_eq!(decode_snapshot_text(b"hello"), "hello");
    }

    #[test]
    fn test_decode_utf8_bom_stripped() {
        let raw = [0xEF, 0xBB, 0xBF, b'h', b'i'];
        assert_eq!(decode_snapshot_text(&raw), "hi");
    }

    #[test]
    fn test_decode_utf16le_bom() {
        let raw = [0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
        assert_eq!(decode_snapshot_text(&raw), "hi");
    }

    #[test]
    fn test_decode_utf16be_bom() {
        let raw = [0xFE, 0xFF, 0x00, b'h', 0x00, b'i'];
        assert_eq!(decode_snapshot_text(&raw), "hi");
    }

    #[test]
    fn test_file_digest_hex() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.reg");
        std::fs::write(&path, b"abc").unwrap();
        // SHA-256("abc")
        assert_eq!(
            file_digest_hex(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
