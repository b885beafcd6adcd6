//! Updraft Core Library
//!
//! This crate provides the domain model shared across all Updraft components:
//! the per-upload [`FileRecord`] entity with its safe-naming algorithm,
//! configuration, and the capability traits the storage and processing
//! crates implement.

pub mod config;
pub mod models;
pub mod probe;

// Re-export commonly used types
pub use config::{Config, DetectionStrategy, ImageVersion};
pub use models::{FileRecord, RawUpload, StorageOrigin, VersionInfo};
pub use probe::DirectoryProbe;
