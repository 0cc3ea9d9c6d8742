//! Storage traits and error types
//!
//! This module defines the trait interface for job status backends and
//! associated error types.

use crate::job::CrawlJob;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Corrupt job document: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for job status backends
///
/// Holds exactly one document: the latest [`CrawlJob`]. Every save replaces
/// it as a whole, so a concurrent reader never observes a partial write.
pub trait JobStore: Send + Sync {
    /// Replaces the stored job
    fn save(&self, job: &CrawlJob) -> StorageResult<()>;

    /// Loads the stored job
    ///
    /// # Returns
    ///
    /// * `Ok(Some(CrawlJob))` - The latest job
    /// * `Ok(None)` - Nothing has been stored yet
    /// * `Err(StorageError)` - The document is unreadable or corrupt
    fn load(&self) -> StorageResult<Option<CrawlJob>>;

    /// The latest job, or the synthetic idle job when none is readable
    fn current(&self) -> CrawlJob {
        match self.load() {
            Ok(Some(job)) => job,
            Ok(None) => CrawlJob::idle(),
            Err(e) => {
                tracing::warn!("Treating unreadable job status as idle: {}", e);
                CrawlJob::idle()
            }
        }
    }
}
