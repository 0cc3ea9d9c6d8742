//! Job status persisted as a single JSON file

use crate::job::CrawlJob;
use crate::output::write_json_atomic;
use crate::storage::traits::{JobStore, StorageResult};
use std::io;
use std::path::{Path, PathBuf};

/// File-backed job store
///
/// Writes go to a sibling temp file that is renamed over the status file.
#[derive(Debug, Clone)]
pub struct FileJobStore {
    path: PathBuf,
}

impl FileJobStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JobStore for FileJobStore {
    fn save(&self, job: &CrawlJob) -> StorageResult<()> {
        write_json_atomic(&self.path, job)?;
        Ok(())
    }

    fn load(&self) -> StorageResult<Option<CrawlJob>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }
}
