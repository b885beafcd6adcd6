//! Domain models.

mod file_record;

pub use file_record::{FileRecord, RawUpload, StorageOrigin, VersionInfo};
