//! Thumbnail-as-copy version generation.
//!
//! In copy-as-thumb mode each configured version is a byte-for-byte copy of
//! the stored original placed under `<uploadDir>/<version>/`. Actual pixel
//! resizing is an external capability; this module only materializes the
//! version files the URL resolver later probes for.

use std::path::{Path, PathBuf};

use updraft_core::{Config, FileRecord, VersionInfo};
use updraft_storage::LocalStore;

/// Copy the stored original into each configured version subdirectory and
/// record the produced versions on the record.
///
/// A failed copy only omits that version; the URL resolver then falls back
/// to the primary URL for it. Records with a terminal error and names that
/// do not match the image extension pattern are skipped entirely.
pub async fn generate_versions(record: &mut FileRecord, config: &Config, store: &LocalStore) {
    if record.error().is_some() {
        return;
    }
    if !config.copy_img_as_thumb || !config.image_file_extensions.is_match(record.name()) {
        return;
    }

    for version in &config.image_versions {
        let from = PathBuf::from(record.name());
        let to = Path::new(&version.name).join(record.name());

        match store.copy(&from, &to).await {
            Ok(()) => {
                record.add_version(
                    &version.name,
                    VersionInfo {
                        width: version.width,
                        height: version.height,
                    },
                );
                tracing::debug!(
                    name = %record.name(),
                    version = %version.name,
                    "version file created"
                );
            }
            Err(e) => {
                tracing::warn!(
                    name = %record.name(),
                    version = %version.name,
                    error = %e,
                    "version copy failed, falling back to primary url"
                );
            }
        }
    }
}
