//! Decode-based format identification.

use std::io::Cursor;
use std::path::Path;

use async_trait::async_trait;
use image::{GenericImageView, ImageReader};

use super::{DetectError, DetectedContent, FormatDetector};

/// Identifies image content by guessing the format from the bytes and then
/// fully decoding it. Decoding doubles as an integrity check: content that
/// merely carries an image signature but does not decode is rejected.
pub struct ImageIdentifyDetector;

#[async_trait]
impl FormatDetector for ImageIdentifyDetector {
    async fn detect(&self, path: &Path) -> Result<DetectedContent, DetectError> {
        let data = tokio::fs::read(path).await?;
        // Image decode is CPU-bound; run off the async pool to avoid
        // blocking other tasks.
        tokio::task::spawn_blocking(move || identify(&data))
            .await
            .map_err(|e| DetectError::Io(std::io::Error::other(e)))?
    }
}

fn identify(data: &[u8]) -> Result<DetectedContent, DetectError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(DetectError::Io)?;

    let Some(format) = reader.format() else {
        return Err(DetectError::Unrecognized);
    };

    let image = reader.decode().map_err(|_| DetectError::Unrecognized)?;
    let (width, height) = image.dimensions();

    Ok(DetectedContent {
        format: format!("{:?}", format).to_lowercase(),
        dimensions: Some((width, height)),
    })
}
