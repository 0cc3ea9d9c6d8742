//! In-memory job store

use crate::job::CrawlJob;
use crate::state::JobStatus;
use crate::storage::traits::{JobStore, StorageResult};
use std::sync::Mutex;

/// Job store kept in memory, recording every saved version
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    history: Mutex<Vec<CrawlJob>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every saved job, oldest first
    pub fn history(&self) -> Vec<CrawlJob> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    /// Status of every save, with consecutive repeats collapsed
    pub fn status_sequence(&self) -> Vec<JobStatus> {
        let mut statuses: Vec<JobStatus> = self.history().iter().map(|job| job.status).collect();
        statuses.dedup();
        statuses
    }
}

impl JobStore for MemoryJobStore {
    fn save(&self, job: &CrawlJob) -> StorageResult<()> {
        if let Ok(mut history) = self.history.lock() {
            history.push(job.clone());
        }
        Ok(())
    }

    fn load(&self) -> StorageResult<Option<CrawlJob>> {
        Ok(self
            .history
            .lock()
            .ok()
            .and_then(|history| history.last().cloned()))
    }
}
