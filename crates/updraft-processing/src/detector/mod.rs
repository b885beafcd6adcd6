//! Content-based format detection.
//!
//! The declared MIME type of an upload is attacker-controlled; acceptance
//! decisions are made from the file's actual bytes. Two strategies exist,
//! selected by configuration: decode-based image identification (yields
//! dimensions) and magic-byte MIME sniffing (yields a MIME string).

mod image_identify;
mod magic_mime;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use updraft_core::{Config, DetectionStrategy};

pub use image_identify::ImageIdentifyDetector;
pub use magic_mime::MagicMimeDetector;

/// Detection failures.
///
/// `Unrecognized` is a statement about the content (malformed, corrupt, or
/// simply not a known format) and maps to a validation failure. `Io` is an
/// infrastructure fault and propagates to the caller.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("unrecognized or corrupt content")]
    Unrecognized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What detection found in the file's bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectedContent {
    /// Lowercase format name (`jpeg`) or MIME type (`image/jpeg`),
    /// depending on the strategy.
    pub format: String,
    /// Pixel dimensions, when the strategy can determine them.
    pub dimensions: Option<(u32, u32)>,
}

/// Content-detection capability.
#[async_trait]
pub trait FormatDetector: Send + Sync {
    async fn detect(&self, path: &Path) -> Result<DetectedContent, DetectError>;
}

/// Create the detector selected by configuration.
pub fn create_detector(config: &Config) -> Arc<dyn FormatDetector> {
    match config.detection_strategy {
        DetectionStrategy::ImageIdentify => Arc::new(ImageIdentifyDetector),
        DetectionStrategy::MagicMime => Arc::new(MagicMimeDetector),
    }
}
