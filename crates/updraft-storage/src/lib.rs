//! Updraft Storage Library
//!
//! Storage-facing side of the upload lifecycle: the [`LocalStore`] bound to
//! the upload directory (existence checks and version copies) and the URL
//! resolver that computes the public, delete, and per-version URLs for a
//! finalized record.
//!
//! Entry names handed to the store are relative paths under the upload
//! directory and must not contain `..` or a leading separator.

pub mod error;
pub mod local;
pub mod resolver;

// Re-export commonly used types
pub use error::{StoreError, StoreResult};
pub use local::LocalStore;
pub use resolver::resolve_urls;
