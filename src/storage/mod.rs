//! Storage module for persisting crawl job status
//!
//! This module holds the latest crawl job so that a separate reader can
//! observe its progress:
//! - The `JobStore` trait and its error type
//! - A file-backed store with atomic whole-document writes
//! - An in-memory store that keeps every saved version

mod file;
mod memory;
mod traits;

pub use file::FileJobStore;
pub use memory::MemoryJobStore;
pub use traits::{JobStore, StorageError, StorageResult};

use std::path::Path;
use std::sync::Arc;

/// Opens the file-backed store at the configured status path
pub fn open_job_store(path: &Path) -> Arc<dyn JobStore> {
    Arc::new(FileJobStore::new(path))
}
