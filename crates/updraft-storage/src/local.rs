//! Local-filesystem store bound to the upload directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use updraft_core::DirectoryProbe;

use crate::error::{StoreError, StoreResult};

/// Store rooted at the upload directory.
///
/// Exposes the two operations the lifecycle core needs from local storage:
/// existence checks (naming collisions, version files) and copies into
/// version subdirectories. Everything else about local files belongs to
/// the surrounding service.
#[derive(Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StoreError::ConfigError(format!(
                "Failed to create upload directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative entry name to a filesystem path, rejecting names
    /// that could escape the upload directory.
    fn entry_path(&self, relative: &Path) -> StoreResult<PathBuf> {
        let raw = relative.to_string_lossy();
        if relative.is_absolute() || raw.contains("..") {
            return Err(StoreError::InvalidName(raw.into_owned()));
        }
        Ok(self.root.join(relative))
    }

    /// Copy an entry to another relative location, creating parent
    /// directories as needed. Used for thumbnail-as-copy version files.
    pub async fn copy(&self, from: &Path, to: &Path) -> StoreResult<()> {
        let from_path = self.entry_path(from)?;
        let to_path = self.entry_path(to)?;

        if !fs::try_exists(&from_path).await.unwrap_or(false) {
            return Err(StoreError::NotFound(from.to_string_lossy().into_owned()));
        }

        if let Some(parent) = to_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::copy(&from_path, &to_path).await.map_err(|e| {
            StoreError::CopyFailed(format!(
                "{} to {}: {}",
                from_path.display(),
                to_path.display(),
                e
            ))
        })?;

        tracing::debug!(
            from = %from.display(),
            to = %to.display(),
            "local store copy successful"
        );

        Ok(())
    }
}

#[async_trait]
impl DirectoryProbe for LocalStore {
    async fn exists(&self, relative: &Path) -> bool {
        match self.entry_path(relative) {
            Ok(path) => fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }
}
