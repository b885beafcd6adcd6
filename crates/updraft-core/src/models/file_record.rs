//! The per-upload file entity.
//!
//! A `FileRecord` is created once per accepted upload, mutated in sequence
//! by the validator and the URL resolver, and discarded once the response
//! describing it has been produced. The durable record of the upload is the
//! file itself, not this entity.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{json, Map, Value};

use crate::probe::DirectoryProbe;

/// Matches an optional ` (n)` counter followed by an optional last
/// dot-extension at the end of a file name.
const NAME_COUNT_PATTERN: &str = r"(?s)^(?P<stem>.*?)(?: \((?P<count>\d+)\))?(?P<ext>\.[^.]+)?$";

fn name_count_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(NAME_COUNT_PATTERN).expect("valid name-counter pattern"))
}

/// Raw upload description as received from the transport layer.
#[derive(Clone, Debug)]
pub struct RawUpload {
    /// Client-declared file name (untrusted).
    pub name: String,
    /// Client-declared byte size.
    pub size: u64,
    /// Client-declared MIME type (untrusted).
    pub content_type: String,
    /// Where the received bytes were spooled, e.g. a temp file.
    pub source_path: PathBuf,
    /// Client-declared last-modified timestamp, if any.
    pub last_modified: Option<DateTime<Utc>>,
}

/// Which backend holds the file's bytes. Fixed at construction; determines
/// how URLs are resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageOrigin {
    /// Local-filesystem-backed storage under the upload directory.
    Local,
    /// Remote object store; `location` is the URL the store returned.
    Remote { location: String },
}

/// Metadata for one generated derived version of the file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VersionInfo {
    pub width: u32,
    pub height: u32,
}

/// Metadata for one uploaded file.
///
/// Field access goes through methods so the two lifecycle invariants hold:
/// the first recorded error is terminal, and the name stays a bare,
/// non-hidden file name once safe naming has run.
#[derive(Clone, Debug)]
pub struct FileRecord {
    name: String,
    size: u64,
    declared_type: String,
    detected_format: Option<String>,
    key: String,
    dimensions: Option<(u32, u32)>,
    versions: BTreeMap<String, VersionInfo>,
    error: Option<String>,
    url: Option<String>,
    delete_url: Option<String>,
    version_urls: BTreeMap<String, String>,
    origin: StorageOrigin,
    source_path: PathBuf,
    modified: Option<DateTime<Utc>>,
}

impl FileRecord {
    pub fn new(upload: RawUpload, origin: StorageOrigin) -> Self {
        let key = upload
            .source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        FileRecord {
            name: upload.name,
            size: upload.size,
            declared_type: upload.content_type,
            detected_format: None,
            key,
            dimensions: None,
            versions: BTreeMap::new(),
            error: None,
            url: None,
            delete_url: None,
            version_urls: BTreeMap::new(),
            origin,
            source_path: upload.source_path,
            modified: upload.last_modified,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    pub fn detected_format(&self) -> Option<&str> {
        self.detected_format.as_deref()
    }

    /// Storage key derived from the source path's base name. Unique per
    /// upload batch, not across time.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    pub fn versions(&self) -> &BTreeMap<String, VersionInfo> {
        &self.versions
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn delete_url(&self) -> Option<&str> {
        self.delete_url.as_deref()
    }

    pub fn version_urls(&self) -> &BTreeMap<String, String> {
        &self.version_urls
    }

    pub fn origin(&self) -> &StorageOrigin {
        &self.origin
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    /// Reconcile the declared size with the observed byte count once the
    /// stream has landed.
    pub fn update_size(&mut self, observed: u64) {
        self.size = observed;
    }

    /// Record a terminal validation error. The first error wins; later
    /// calls are ignored.
    pub fn set_error(&mut self, message: &str) {
        if self.error.is_none() {
            self.error = Some(message.to_string());
        }
    }

    /// Record the content-detected format and, for images, dimensions.
    pub fn set_detected(&mut self, format: String, dimensions: Option<(u32, u32)>) {
        self.detected_format = Some(format);
        if dimensions.is_some() {
            self.dimensions = dimensions;
        }
    }

    /// Record that a derived version was generated.
    pub fn add_version(&mut self, name: &str, info: VersionInfo) {
        self.versions.insert(name.to_string(), info);
    }

    /// Set the primary and delete URLs. Called by the URL resolver.
    pub fn set_primary_urls(&mut self, url: String, delete_url: String) {
        self.url = Some(url);
        self.delete_url = Some(delete_url);
    }

    /// Set one version's URL. Called by the URL resolver.
    pub fn set_version_url(&mut self, version: &str, url: String) {
        self.version_urls.insert(version.to_string(), url);
    }

    /// Derive a name that cannot traverse directories, cannot create hidden
    /// files, and does not collide with any existing entry in the upload
    /// directory.
    ///
    /// On collision the name gains or increments a ` (n)` counter placed
    /// before the last dot-extension: `a.txt` becomes `a (1).txt`, then
    /// `a (2).txt`, and so on. The counter is strictly increasing and the
    /// directory is finite, so the loop terminates.
    pub async fn ensure_unique_name(&mut self, probe: &dyn DirectoryProbe) {
        self.name = sanitize_name(&self.name);
        while probe.exists(Path::new(&self.name)).await {
            self.name = bump_name_counter(&self.name);
        }
    }

    /// Build the response payload describing this record.
    ///
    /// Version URL keys are dynamic (`thumbnailUrl`, `mediumUrl`, ...), so
    /// the payload is assembled as a JSON map rather than a derived struct.
    pub fn to_response(&self) -> Value {
        let mut payload = Map::new();
        payload.insert("name".to_string(), json!(self.name));
        payload.insert("size".to_string(), json!(self.size));
        payload.insert("type".to_string(), json!(self.declared_type));

        if let Some(modified) = self.modified {
            payload.insert("modified".to_string(), json!(modified.to_rfc3339()));
        }

        if let Some(url) = &self.url {
            payload.insert("url".to_string(), json!(url));
        }
        if let Some(delete_url) = &self.delete_url {
            payload.insert("deleteUrl".to_string(), json!(delete_url));
            payload.insert("deleteType".to_string(), json!("DELETE"));
        }
        for (version, url) in &self.version_urls {
            payload.insert(format!("{}Url", version), json!(url));
        }
        if let Some(error) = &self.error {
            payload.insert("error".to_string(), json!(error));
        }

        Value::Object(payload)
    }
}

/// Keep only the final path segment and strip leading dots, so the result
/// can neither traverse directories nor create a hidden file.
fn sanitize_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let trimmed = base.trim_start_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Increment the ` (n)` counter before the last dot-extension, starting at
/// 1 when no counter is present.
fn bump_name_counter(name: &str) -> String {
    let Some(caps) = name_count_regex().captures(name) else {
        return format!("{} (1)", name);
    };

    let stem = caps.name("stem").map(|m| m.as_str()).unwrap_or_default();
    let count = caps
        .name("count")
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(0);
    let ext = caps.name("ext").map(|m| m.as_str()).unwrap_or_default();

    format!("{} ({}){}", stem, count + 1, ext)
}
