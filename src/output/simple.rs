//! Simplified per-page view of a job's first domain report

use crate::job::CrawlJob;
use crate::output::types::{IndexStatus, LinkRecord};
use serde::Serialize;

/// Indexing and link status summary of one crawled page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimplePage {
    pub url: String,
    pub final_url: String,
    pub status: Option<u16>,
    pub index_status: IndexStatus,
    pub meta_robots: Option<String>,
    pub internal_links: Vec<LinkRecord>,
    pub external_links: Vec<LinkRecord>,
}

/// Returns the simplified page list of the job's first report
///
/// `None` when the job has no report yet.
pub fn simple_report(job: &CrawlJob) -> Option<Vec<SimplePage>> {
    let report = job.reports.as_ref()?.first()?;

    Some(
        report
            .pages
            .iter()
            .map(|page| SimplePage {
                url: page.url.clone(),
                final_url: page.final_url.clone(),
                status: page.status,
                index_status: page.index_status,
                meta_robots: page.meta_robots.clone(),
                internal_links: page.internal_links.clone(),
                external_links: page.external_links.clone(),
            })
            .collect(),
    )
}
