//! Updraft Processing Library
//!
//! Content-side of the upload lifecycle: content-based format detection
//! (two interchangeable strategies), the acceptance-policy validator, and
//! thumbnail-as-copy version generation.

pub mod detector;
pub mod validator;
pub mod versions;

// Re-export commonly used types
pub use detector::{
    create_detector, DetectError, DetectedContent, FormatDetector, ImageIdentifyDetector,
    MagicMimeDetector,
};
pub use validator::{Validator, ValidatorError};
pub use versions::generate_versions;
