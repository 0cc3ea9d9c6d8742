//! Job execution: resolving targets, crawling them in order, persisting progress

use crate::config::Config;
use crate::crawler::DomainCrawler;
use crate::job::CrawlJob;
use crate::output::{write_domain_report, DomainReport};
use crate::scope::{resolve_target, CrawlRequest, CrawlTarget, DomainInput};
use crate::state::JobStatus;
use crate::storage::JobStore;
use crate::CrawlError;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Runs crawl jobs and persists their status after every change
pub struct JobRunner {
    crawler: DomainCrawler,
    store: Arc<dyn JobStore>,
}

impl JobRunner {
    /// Creates a runner with the default HTTP crawler
    pub fn new(config: Config, store: Arc<dyn JobStore>) -> Result<Self, CrawlError> {
        Ok(Self::with_crawler(DomainCrawler::new(config)?, store))
    }

    pub fn with_crawler(crawler: DomainCrawler, store: Arc<dyn JobStore>) -> Self {
        Self { crawler, store }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// The latest persisted job, or the idle job
    pub fn current(&self) -> CrawlJob {
        self.store.current()
    }

    /// Accepts a job: creates it as `pending` and persists it before any network activity
    pub fn start(&self) -> CrawlJob {
        let job = CrawlJob::pending();
        self.persist(&job);
        tracing::info!("Accepted crawl job {}", job.job_id);
        job
    }

    /// Accepts a job and runs it in the background
    ///
    /// The returned job is already persisted as `pending`; the handle resolves
    /// to the finished job.
    pub fn spawn(self: &Arc<Self>, inputs: Vec<DomainInput>) -> (CrawlJob, JoinHandle<CrawlJob>) {
        let job = self.start();
        let runner = Arc::clone(self);
        let pending = job.clone();
        let handle = tokio::spawn(async move { runner.run(pending, inputs).await });
        (job, handle)
    }

    /// Accepts and runs a single crawl request to completion
    pub async fn run_request(&self, request: CrawlRequest) -> CrawlJob {
        let job = self.start();
        self.run(job, vec![request.into()]).await
    }

    /// Runs a pending job over the given domain inputs
    ///
    /// Inputs that resolve to no seed URL are skipped. Targets are crawled one
    /// after another; each finished report is appended to the job and
    /// persisted. If a crawl fails unexpectedly the job becomes `failed` and
    /// keeps the reports completed so far. Never returns an error: the outcome
    /// is expressed in the returned job.
    pub async fn run(&self, mut job: CrawlJob, inputs: Vec<DomainInput>) -> CrawlJob {
        let default_max_pages = self.crawler.config().limits.max_pages_per_domain;

        let mut targets = Vec::new();
        for input in &inputs {
            match resolve_target(input, default_max_pages) {
                Ok(target) => targets.push(target),
                Err(e) => tracing::warn!("Skipping domain input {:?}: {}", input.domain, e),
            }
        }
        let skipped = inputs.len() - targets.len();

        let running_message = format!("Running crawl for {} domain(s)", targets.len());
        if let Err(e) = job.transition(JobStatus::Running, running_message) {
            tracing::error!("Cannot run job {}: {}", job.job_id, e);
            return job;
        }
        job.reports = Some(Vec::new());
        self.persist(&job);

        let total = targets.len();
        for (index, target) in targets.into_iter().enumerate() {
            tracing::info!("Crawling domain {}/{}: {}", index + 1, total, target.domain);

            match self.crawl_target(target).await {
                Ok(report) => {
                    job.push_report(report);
                    self.persist(&job);
                }
                Err(e) => {
                    tracing::error!("Job {} failed: {}", job.job_id, e);
                    self.finish(&mut job, JobStatus::Failed, format!("Error: {}", e));
                    return job;
                }
            }
        }

        let mut message = format!("Completed crawl for {} domain(s)", total);
        if skipped > 0 {
            message.push_str(&format!(", skipped {} invalid input(s)", skipped));
        }
        self.finish(&mut job, JobStatus::Done, message);
        job
    }

    /// Crawls one target on its own task and persists its report file
    ///
    /// A panic inside the crawl surfaces as `JobFailed`.
    async fn crawl_target(&self, target: CrawlTarget) -> Result<DomainReport, CrawlError> {
        let crawler = self.crawler.clone();
        let report = tokio::spawn(async move { crawler.crawl(&target).await })
            .await
            .map_err(|e| CrawlError::JobFailed(format!("crawl task aborted: {}", e)))?;

        let reports_dir = &self.crawler.config().output.reports_dir;
        let path = write_domain_report(Path::new(reports_dir), &report)?;

        Ok(report.into_job_report(path.display().to_string()))
    }

    fn finish(&self, job: &mut CrawlJob, status: JobStatus, message: String) {
        match job.transition(status, message) {
            Ok(()) => {
                tracing::info!("Job {} is {}", job.job_id, job.status);
                self.persist(job);
            }
            Err(e) => tracing::error!("Job {}: {}", job.job_id, e),
        }
    }

    /// Saves the job; failures are logged and never interrupt the crawl
    fn persist(&self, job: &CrawlJob) {
        if let Err(e) = self.store.save(job) {
            tracing::warn!("Failed to persist job {}: {}", job.job_id, e);
        }
    }
}
