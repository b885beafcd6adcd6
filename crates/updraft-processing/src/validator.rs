//! Acceptance-policy validation.
//!
//! Checks run in a fixed order: content detection, allow-list membership,
//! then size bounds. The first failure is recorded on the record and later
//! checks cannot overwrite it, so a disallowed type is always reported as a
//! type error even when the size is out of bounds too.

use std::sync::Arc;

use thiserror::Error;

use updraft_core::{Config, FileRecord};

use crate::detector::{DetectError, FormatDetector};

pub const ERR_TYPE_NOT_ALLOWED: &str = "Filetype not allowed";
pub const ERR_FILE_TOO_SMALL: &str = "File is too small";
pub const ERR_FILE_TOO_BIG: &str = "File is too big";

/// Infrastructure faults during validation, distinct from the recoverable
/// policy failures recorded on the record itself.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("Detection capability failed: {0}")]
    Detection(#[source] std::io::Error),
}

/// Validates one record against the configured acceptance policy.
pub struct Validator {
    detector: Arc<dyn FormatDetector>,
    accept_file_types: Vec<String>,
    accept_mime_types: Vec<String>,
    min_file_size: Option<u64>,
    max_file_size: Option<u64>,
}

impl Validator {
    pub fn new(config: &Config, detector: Arc<dyn FormatDetector>) -> Self {
        Validator {
            detector,
            accept_file_types: config.accept_file_types.clone(),
            accept_mime_types: config.accept_mime_types.clone(),
            min_file_size: config.min_file_size,
            max_file_size: config.max_file_size,
        }
    }

    /// Run the ordered checks against `record`.
    ///
    /// Returns `Ok(true)` when the record passed, `Ok(false)` when a policy
    /// failure was recorded on it, and `Err` only for infrastructure faults
    /// (detection capability unreachable, file unreadable) so the caller
    /// can decide between retry and abort.
    pub async fn validate(&self, record: &mut FileRecord) -> Result<bool, ValidatorError> {
        if record.error().is_some() {
            return Ok(false);
        }

        match self.detector.detect(record.source_path()).await {
            Ok(found) => {
                let format = found.format.to_lowercase();
                let accepted = self.is_accepted(&format);
                record.set_detected(format, found.dimensions);
                if !accepted {
                    record.set_error(ERR_TYPE_NOT_ALLOWED);
                }
            }
            // Malformed content is a policy failure, not a fault.
            Err(DetectError::Unrecognized) => {
                record.set_error(ERR_TYPE_NOT_ALLOWED);
            }
            Err(DetectError::Io(e)) => return Err(ValidatorError::Detection(e)),
        }

        if record.error().is_none() {
            if let Some(min) = self.min_file_size {
                if record.size() < min {
                    record.set_error(ERR_FILE_TOO_SMALL);
                }
            }
        }
        if record.error().is_none() {
            if let Some(max) = self.max_file_size {
                if record.size() > max {
                    record.set_error(ERR_FILE_TOO_BIG);
                }
            }
        }

        if let Some(error) = record.error() {
            tracing::debug!(
                name = %record.name(),
                size = record.size(),
                detected = record.detected_format().unwrap_or("none"),
                error = %error,
                "upload rejected"
            );
            return Ok(false);
        }
        Ok(true)
    }

    fn is_accepted(&self, format: &str) -> bool {
        self.accept_file_types.iter().any(|t| t == format)
            || self.accept_mime_types.iter().any(|t| t == format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::DetectedContent;
    use async_trait::async_trait;
    use regex::Regex;
    use std::path::{Path, PathBuf};
    use updraft_core::{DetectionStrategy, RawUpload, StorageOrigin};

    struct FixedDetector {
        format: &'static str,
        dimensions: Option<(u32, u32)>,
    }

    #[async_trait]
    impl FormatDetector for FixedDetector {
        async fn detect(&self, _path: &Path) -> Result<DetectedContent, DetectError> {
            Ok(DetectedContent {
                format: self.format.to_string(),
                dimensions: self.dimensions,
            })
        }
    }

    struct UnrecognizedDetector;

    #[async_trait]
    impl FormatDetector for UnrecognizedDetector {
        async fn detect(&self, _path: &Path) -> Result<DetectedContent, DetectError> {
            Err(DetectError::Unrecognized)
        }
    }

    struct UnreachableDetector;

    #[async_trait]
    impl FormatDetector for UnreachableDetector {
        async fn detect(&self, _path: &Path) -> Result<DetectedContent, DetectError> {
            Err(DetectError::Io(std::io::Error::other("capability down")))
        }
    }

    fn config() -> Config {
        Config {
            upload_dir: PathBuf::from("uploads"),
            upload_url: "/files/".to_string(),
            host: "example.org".to_string(),
            use_ssl: false,
            min_file_size: Some(100),
            max_file_size: Some(10_000),
            accept_file_types: vec!["jpeg".to_string(), "png".to_string()],
            accept_mime_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
            image_versions: vec![],
            copy_img_as_thumb: false,
            image_file_extensions: Regex::new(r"(?i)\.(gif|jpe?g|png)$").unwrap(),
            detection_strategy: DetectionStrategy::ImageIdentify,
        }
    }

    fn record(size: u64) -> FileRecord {
        FileRecord::new(
            RawUpload {
                name: "photo.jpg".to_string(),
                size,
                content_type: "image/jpeg".to_string(),
                source_path: PathBuf::from("/tmp/upload_0001"),
                last_modified: None,
            },
            StorageOrigin::Local,
        )
    }

    #[tokio::test]
    async fn test_accepted_format_passes() {
        let validator = Validator::new(
            &config(),
            Arc::new(FixedDetector {
                format: "jpeg",
                dimensions: Some((640, 480)),
            }),
        );
        let mut rec = record(1024);

        assert!(validator.validate(&mut rec).await.unwrap());
        assert_eq!(rec.detected_format(), Some("jpeg"));
        assert_eq!(rec.dimensions(), Some((640, 480)));
        assert!(rec.error().is_none());
    }

    #[tokio::test]
    async fn test_accepted_mime_type_passes() {
        let validator = Validator::new(
            &config(),
            Arc::new(FixedDetector {
                format: "image/png",
                dimensions: None,
            }),
        );
        let mut rec = record(1024);

        assert!(validator.validate(&mut rec).await.unwrap());
        assert_eq!(rec.detected_format(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_disallowed_format_is_rejected() {
        let validator = Validator::new(
            &config(),
            Arc::new(FixedDetector {
                format: "tiff",
                dimensions: Some((10, 10)),
            }),
        );
        let mut rec = record(1024);

        assert!(!validator.validate(&mut rec).await.unwrap());
        assert_eq!(rec.error(), Some(ERR_TYPE_NOT_ALLOWED));
        // Detection still recorded what it found.
        assert_eq!(rec.detected_format(), Some("tiff"));
    }

    #[tokio::test]
    async fn test_type_error_wins_over_size_error() {
        let validator = Validator::new(
            &config(),
            Arc::new(FixedDetector {
                format: "tiff",
                dimensions: None,
            }),
        );
        // Size is also below the minimum; the type error must be reported.
        let mut rec = record(10);

        assert!(!validator.validate(&mut rec).await.unwrap());
        assert_eq!(rec.error(), Some(ERR_TYPE_NOT_ALLOWED));
    }

    #[tokio::test]
    async fn test_too_small_is_rejected() {
        let validator = Validator::new(
            &config(),
            Arc::new(FixedDetector {
                format: "jpeg",
                dimensions: None,
            }),
        );
        let mut rec = record(10);

        assert!(!validator.validate(&mut rec).await.unwrap());
        assert_eq!(rec.error(), Some(ERR_FILE_TOO_SMALL));
    }

    #[tokio::test]
    async fn test_too_big_is_rejected() {
        let validator = Validator::new(
            &config(),
            Arc::new(FixedDetector {
                format: "jpeg",
                dimensions: None,
            }),
        );
        let mut rec = record(1_000_000);

        assert!(!validator.validate(&mut rec).await.unwrap());
        assert_eq!(rec.error(), Some(ERR_FILE_TOO_BIG));
    }

    #[tokio::test]
    async fn test_unrecognized_content_is_a_type_failure() {
        let validator = Validator::new(&config(), Arc::new(UnrecognizedDetector));
        let mut rec = record(1024);

        assert!(!validator.validate(&mut rec).await.unwrap());
        assert_eq!(rec.error(), Some(ERR_TYPE_NOT_ALLOWED));
    }

    #[tokio::test]
    async fn test_infrastructure_fault_propagates() {
        let validator = Validator::new(&config(), Arc::new(UnreachableDetector));
        let mut rec = record(1024);

        assert!(validator.validate(&mut rec).await.is_err());
        // A fault is not a policy decision; the record stays clean.
        assert!(rec.error().is_none());
    }

    #[tokio::test]
    async fn test_existing_error_short_circuits() {
        let validator = Validator::new(
            &config(),
            Arc::new(FixedDetector {
                format: "jpeg",
                dimensions: None,
            }),
        );
        let mut rec = record(1024);
        rec.set_error("File is too small");

        assert!(!validator.validate(&mut rec).await.unwrap());
        assert_eq!(rec.error(), Some("File is too small"));
        assert!(rec.detected_format().is_none());
    }
}
