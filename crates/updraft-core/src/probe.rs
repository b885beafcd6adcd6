//! Directory-existence capability.
//!
//! Naming-collision checks and version-file probing both reduce to "does an
//! entry exist at this relative path under the upload directory". The trait
//! lives in core so the entity can depend on the capability without
//! depending on a concrete storage backend.

use async_trait::async_trait;
use std::path::Path;

/// Read-only existence checks against a directory tree rooted at the
/// upload directory.
///
/// Implementations must not mutate anything. An existence check and a
/// later write are not atomic; callers accept that window.
#[async_trait]
pub trait DirectoryProbe: Send + Sync {
    /// Whether an entry exists at `relative` under the probe's root.
    async fn exists(&self, relative: &Path) -> bool;
}
