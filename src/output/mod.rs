//! Output module for crawl reports
//!
//! This module handles:
//! - The per-page and per-domain report model and its JSON wire shape
//! - Atomic persistence of domain reports and extracted pages
//! - The simplified per-page view of a job's first report

mod simple;
mod types;
mod writer;

pub use simple::{simple_report, SimplePage};
pub use types::{
    DomainCrawlReport, DomainReport, EffectiveConfig, IndexStatus, LinkRecord, PageCrawlResult,
    EXTRACTION_FAILED, FETCH_FAILED,
};
pub use writer::{report_path, save_extracted_page, write_domain_report, write_json_atomic};
