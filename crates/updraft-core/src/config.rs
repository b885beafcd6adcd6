//! Configuration module
//!
//! Environment-based configuration for the upload service: upload directory
//! and URL prefix, acceptance policy, size bounds, derived image versions,
//! and the content-detection strategy.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use regex::Regex;

const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_UPLOAD_URL: &str = "/files/";
const DEFAULT_ACCEPT_FILE_TYPES: &str = "jpeg,png,gif";
const DEFAULT_ACCEPT_MIME_TYPES: &str = "image/jpeg,image/png,image/gif";
const DEFAULT_IMAGE_VERSIONS: &str = "thumbnail=80x80";
const DEFAULT_IMAGE_FILE_EXTENSION_PATTERN: &str = r"(?i)\.(gif|jpe?g|png)$";

/// Content-detection strategies
///
/// Both strategies populate the record's detected format; they differ in
/// what they return ("jpeg" vs "image/jpeg") and whether dimensions are
/// available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionStrategy {
    /// Decode-based format identification; yields dimensions for images.
    ImageIdentify,
    /// Magic-byte MIME sniffing; yields a MIME string, no dimensions.
    MagicMime,
}

impl FromStr for DetectionStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image-identify" | "image" => Ok(DetectionStrategy::ImageIdentify),
            "magic-mime" | "mime" => Ok(DetectionStrategy::MagicMime),
            _ => Err(anyhow::anyhow!("Invalid detection strategy: {}", s)),
        }
    }
}

impl Display for DetectionStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DetectionStrategy::ImageIdentify => write!(f, "image-identify"),
            DetectionStrategy::MagicMime => write!(f, "magic-mime"),
        }
    }
}

/// A configured derived variant of an uploaded image, stored under a
/// version-specific subdirectory of the upload directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageVersion {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// Application configuration (upload handling).
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory uploaded files are stored in.
    pub upload_dir: PathBuf,
    /// URL path prefix files are served under, with leading and trailing `/`.
    pub upload_url: String,
    /// Public host (and optional port) files are served from.
    pub host: String,
    pub use_ssl: bool,
    pub min_file_size: Option<u64>,
    pub max_file_size: Option<u64>,
    /// Accepted detected formats, e.g. `jpeg`, `png`.
    pub accept_file_types: Vec<String>,
    /// Accepted detected MIME types, e.g. `image/jpeg`.
    pub accept_mime_types: Vec<String>,
    pub image_versions: Vec<ImageVersion>,
    /// Copy stored images into version subdirectories instead of resizing.
    pub copy_img_as_thumb: bool,
    /// Pattern a resolved file name must match to qualify for versions.
    pub image_file_extensions: Regex,
    pub detection_strategy: DetectionStrategy,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let host = env::var("HOST")
            .map_err(|_| anyhow::anyhow!("HOST must be set to the public host name"))?;

        let upload_url = env::var("UPLOAD_URL").unwrap_or_else(|_| DEFAULT_UPLOAD_URL.to_string());

        let accept_file_types = env::var("ACCEPT_FILE_TYPES")
            .unwrap_or_else(|_| DEFAULT_ACCEPT_FILE_TYPES.to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let accept_mime_types = env::var("ACCEPT_MIME_TYPES")
            .unwrap_or_else(|_| DEFAULT_ACCEPT_MIME_TYPES.to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let image_versions = parse_image_versions(
            &env::var("IMAGE_VERSIONS").unwrap_or_else(|_| DEFAULT_IMAGE_VERSIONS.to_string()),
        )?;

        let pattern = env::var("IMAGE_FILE_EXTENSION_PATTERN")
            .unwrap_or_else(|_| DEFAULT_IMAGE_FILE_EXTENSION_PATTERN.to_string());
        let image_file_extensions = Regex::new(&pattern)
            .map_err(|e| anyhow::anyhow!("IMAGE_FILE_EXTENSION_PATTERN is not a valid regex: {}", e))?;

        let detection_strategy = env::var("DETECTION_STRATEGY")
            .unwrap_or_else(|_| DetectionStrategy::ImageIdentify.to_string())
            .parse()?;

        let config = Config {
            upload_dir: PathBuf::from(
                env::var("UPLOAD_DIR").unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.to_string()),
            ),
            upload_url,
            host,
            use_ssl: env::var("USE_SSL")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            min_file_size: env::var("MIN_FILE_SIZE").ok().and_then(|s| s.parse().ok()),
            max_file_size: env::var("MAX_FILE_SIZE").ok().and_then(|s| s.parse().ok()),
            accept_file_types,
            accept_mime_types,
            image_versions,
            copy_img_as_thumb: env::var("COPY_IMG_AS_THUMB")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            image_file_extensions,
            detection_strategy,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.host.trim().is_empty() {
            return Err(anyhow::anyhow!("HOST cannot be empty"));
        }

        if !self.upload_url.starts_with('/') || !self.upload_url.ends_with('/') {
            return Err(anyhow::anyhow!(
                "UPLOAD_URL must start and end with '/' (got '{}')",
                self.upload_url
            ));
        }

        if let (Some(min), Some(max)) = (self.min_file_size, self.max_file_size) {
            if min > max {
                return Err(anyhow::anyhow!(
                    "MIN_FILE_SIZE ({}) cannot exceed MAX_FILE_SIZE ({})",
                    min,
                    max
                ));
            }
        }

        if self.accept_file_types.is_empty() && self.accept_mime_types.is_empty() {
            return Err(anyhow::anyhow!(
                "At least one of ACCEPT_FILE_TYPES or ACCEPT_MIME_TYPES must be non-empty"
            ));
        }

        Ok(())
    }
}

/// Parse `name=WxH` pairs, e.g. `thumbnail=80x80,medium=300x300`.
fn parse_image_versions(raw: &str) -> Result<Vec<ImageVersion>, anyhow::Error> {
    let mut versions = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, dims) = entry
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Invalid image version '{}', expected name=WxH", entry))?;
        let (w, h) = dims
            .split_once('x')
            .ok_or_else(|| anyhow::anyhow!("Invalid image version '{}', expected name=WxH", entry))?;
        versions.push(ImageVersion {
            name: name.trim().to_string(),
            width: w.trim().parse().map_err(|_| {
                anyhow::anyhow!("Invalid width in image version '{}'", entry)
            })?,
            height: h.trim().parse().map_err(|_| {
                anyhow::anyhow!("Invalid height in image version '{}'", entry)
            })?,
        });
    }
    Ok(versions)
}
