//! URL resolution for finalized records.
//!
//! Resolution never fails: a record whose validation recorded an error is
//! left untouched, and a version file that was never generated falls back
//! to the primary URL so consumers never render a broken link.

use std::path::Path;

use updraft_core::{Config, DirectoryProbe, FileRecord, StorageOrigin};

/// Compute the public, delete, and per-version URLs for `record`.
///
/// Local-origin records are addressed under
/// `scheme://host<upload_url><name>`; remote-origin records keep the URL
/// the upstream store returned. Version URLs are only produced when
/// thumbnail-as-copy is enabled and the resolved name matches the
/// configured image extension pattern.
pub async fn resolve_urls(record: &mut FileRecord, config: &Config, probe: &dyn DirectoryProbe) {
    if record.error().is_some() {
        return;
    }

    let scheme = if config.use_ssl { "https" } else { "http" };
    let base_url = format!("{}://{}{}", scheme, config.host, config.upload_url);

    match record.origin().clone() {
        StorageOrigin::Local => {
            let url = format!("{}{}", base_url, urlencoding::encode(record.name()));
            record.set_primary_urls(url.clone(), url.clone());

            if !qualifies_for_versions(record.name(), config) {
                return;
            }
            for version in &config.image_versions {
                let version_file = Path::new(&version.name).join(record.name());
                let version_url = if probe.exists(&version_file).await {
                    format!(
                        "{}{}/{}",
                        base_url,
                        version.name,
                        urlencoding::encode(record.name())
                    )
                } else {
                    // Version generation did not produce a file; point the
                    // version at the original instead.
                    url.clone()
                };
                record.set_version_url(&version.name, version_url);
            }
        }
        StorageOrigin::Remote { location } => {
            let last_segment = location
                .rsplit('/')
                .next()
                .unwrap_or("")
                .split('?')
                .next()
                .unwrap_or("");
            let delete_url = format!("{}{}", config.upload_url, last_segment);
            record.set_primary_urls(location.clone(), delete_url);

            if !qualifies_for_versions(record.name(), config) {
                return;
            }
            // The remote store holds no per-version derivations; every
            // version resolves to the primary URL.
            for version in &config.image_versions {
                record.set_version_url(&version.name, location.clone());
            }
        }
    }
}

fn qualifies_for_versions(name: &str, config: &Config) -> bool {
    config.copy_img_as_thumb && config.image_file_extensions.is_match(name)
}
