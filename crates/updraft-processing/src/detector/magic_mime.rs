//! Magic-byte MIME sniffing.

use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;

use super::{DetectError, DetectedContent, FormatDetector};

// Longest signature we check is RIFF/WEBP at 12 bytes.
const SNIFF_LEN: u64 = 16;

/// Sniffs the MIME type from the file's leading bytes. Cheaper than a full
/// decode and works for non-image formats, but yields no dimensions.
pub struct MagicMimeDetector;

#[async_trait]
impl FormatDetector for MagicMimeDetector {
    async fn detect(&self, path: &Path) -> Result<DetectedContent, DetectError> {
        let file = tokio::fs::File::open(path).await?;
        let mut head = Vec::with_capacity(SNIFF_LEN as usize);
        file.take(SNIFF_LEN).read_to_end(&mut head).await?;

        let mime = sniff_mime(&head).ok_or(DetectError::Unrecognized)?;

        Ok(DetectedContent {
            format: mime.to_string(),
            dimensions: None,
        })
    }
}

fn sniff_mime(head: &[u8]) -> Option<&'static str> {
    if head.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if head.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        Some("image/png")
    } else if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if head.len() >= 12 && head.starts_with(b"RIFF") && &head[8..12] == b"WEBP" {
        Some("image/webp")
    } else if head.starts_with(b"BM") {
        Some("image/bmp")
    } else if head.starts_with(b"%PDF") {
        Some("application/pdf")
    } else if head.starts_with(&[0x50, 0x4B, 0x03, 0x04])
        || head.starts_with(&[0x50, 0x4B, 0x05, 0x06])
        || head.starts_with(&[0x50, 0x4B, 0x07, 0x08])
    {
        Some("application/zip")
    } else if head.starts_with(&[0x1F, 0x8B]) {
        Some("application/gzip")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_known_signatures() {
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(
            sniff_mime(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            Some("image/png")
        );
        assert_eq!(sniff_mime(b"GIF89a..."), Some("image/gif"));
        assert_eq!(sniff_mime(b"RIFF\x00\x00\x00\x00WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_mime(b"%PDF-1.7"), Some("application/pdf"));
        assert_eq!(sniff_mime(&[0x50, 0x4B, 0x03, 0x04]), Some("application/zip"));
    }

    #[test]
    fn test_sniff_unknown_bytes() {
        assert_eq!(sniff_mime(b"plain old text"), None);
        assert_eq!(sniff_mime(&[]), None);
        // Truncated RIFF header without the WEBP tag.
        assert_eq!(sniff_mime(b"RIFF1234"), None);
    }

    #[tokio::test]
    async fn test_detect_reads_only_the_head() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.jpg");
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
        data.extend_from_slice(&[0u8; 4096]);
        std::fs::write(&path, &data).unwrap();

        let found = MagicMimeDetector.detect(&path).await.unwrap();
        assert_eq!(found.format, "image/jpeg");
        assert_eq!(found.dimensions, None);
    }

    #[tokio::test]
    async fn test_unknown_content_is_unrecognized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mystery.bin");
        std::fs::write(&path, b"no signature here").unwrap();

        let result = MagicMimeDetector.detect(&path).await;
        assert!(matches!(result, Err(DetectError::Unrecognized)));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_fault() {
        let dir = tempdir().unwrap();
        let result = MagicMimeDetector.detect(&dir.path().join("gone.bin")).await;
        assert!(matches!(result, Err(DetectError::Io(_))));
    }
}
