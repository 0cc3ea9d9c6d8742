//! Crawl jobs: the unit of work a caller submits and observes
//!
//! A job wraps one or more domain crawls. Its status moves
//! `pending → running → {done | failed}` and every transition is persisted
//! through a [`JobStore`](crate::storage::JobStore).

mod runner;

pub use runner::JobRunner;

use crate::output::DomainReport;
use crate::state::JobStatus;
use crate::CrawlError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message of a freshly accepted job
pub const SCHEDULED_MESSAGE: &str = "scheduled";

/// Message of the synthetic idle job
pub const IDLE_MESSAGE: &str = "No crawl job has been started yet";

/// A crawl job as exposed to callers and persisted for readers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlJob {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub message: Option<String>,
    /// `None` until the job starts running
    #[serde(default)]
    pub reports: Option<Vec<DomainReport>>,
}

impl CrawlJob {
    /// A newly accepted job with a fresh id
    pub fn pending() -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            status: JobStatus::Pending,
            message: Some(SCHEDULED_MESSAGE.to_string()),
            reports: None,
        }
    }

    /// The job reported when nothing has run yet
    pub fn idle() -> Self {
        Self {
            job_id: "none".to_string(),
            status: JobStatus::Idle,
            message: Some(IDLE_MESSAGE.to_string()),
            reports: None,
        }
    }

    /// Moves the job to `to`, replacing its message
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The transition is part of the job lifecycle
    /// * `Err(CrawlError::InvalidTransition)` - It is not; the job is unchanged
    pub fn transition(&mut self, to: JobStatus, message: impl Into<String>) -> Result<(), CrawlError> {
        if !self.status.can_transition_to(to) {
            return Err(CrawlError::InvalidTransition {
                from: self.status,
                to,
            });
        }

        self.status = to;
        self.message = Some(message.into());
        Ok(())
    }

    /// Appends a finished domain report
    pub fn push_report(&mut self, report: DomainReport) {
        self.reports.get_or_insert_with(Vec::new).push(report);
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(domain: &str) -> DomainReport {
        DomainReport {
            domain: domain.to_string(),
            slug: domain.replace('.', "_"),
            duration_ms: 1,
            report_path: String::new(),
            pages: Vec::new(),
        }
    }

    #[test]
    fn test_pending_job() {
        let job = CrawlJob::pending();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.message.as_deref(), Some(SCHEDULED_MESSAGE));
        assert!(job.reports.is_none());
        assert!(Uuid::parse_str(&job.job_id).is_ok());
        assert_ne!(job.job_id, CrawlJob::pending().job_id);
    }

    #[test]
    fn test_idle_job() {
        let job = CrawlJob::idle();
        assert_eq!(job.job_id, "none");
        assert_eq!(job.status, JobStatus::Idle);
        assert_eq!(job.message.as_deref(), Some(IDLE_MESSAGE));
    }

    #[test]
    fn test_valid_transitions() {
        let mut job = CrawlJob::pending();
        job.transition(JobStatus::Running, "Running crawl for 1 domain(s)")
            .unwrap();
        job.transition(JobStatus::Done, "Completed crawl for 1 domain(s)")
            .unwrap();
        assert!(job.is_finished());
        assert_eq!(job.message.as_deref(), Some("Completed crawl for 1 domain(s)"));
    }

    #[test]
    fn test_invalid_transition_leaves_job_unchanged() {
        let mut job = CrawlJob::pending();
        let err = job.transition(JobStatus::Done, "done").unwrap_err();
        assert!(matches!(
            err,
            CrawlError::InvalidTransition {
                from: JobStatus::Pending,
                to: JobStatus::Done
            }
        ));
        assert_eq!(err.to_string(), "Invalid job transition: pending -> done");
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.message.as_deref(), Some(SCHEDULED_MESSAGE));
    }

    #[test]
    fn test_push_report() {
        let mut job = CrawlJob::pending();
        job.push_report(report("a.com"));
        job.push_report(report("b.com"));
        let domains: Vec<&str> = job
            .reports
            .as_ref()
            .unwrap()
            .iter()
            .map(|r| r.domain.as_str())
            .collect();
        assert_eq!(domains, vec!["a.com", "b.com"]);
    }

    #[test]
    fn test_deserialize_minimal() {
        let job: CrawlJob =
            serde_json::from_str(r#"{"job_id": "x", "status": "failed"}"#).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.message.is_none());
        assert!(job.reports.is_none());
    }
}
