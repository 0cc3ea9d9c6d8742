//! Atomic JSON artifact writing
//!
//! Every document is written to a sibling temp file and renamed over the
//! target, so a concurrent reader sees either the old or the new document and
//! never a partial one.

use crate::crawler::ExtractedPage;
use crate::output::types::DomainCrawlReport;
use crate::CrawlError;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes `value` as pretty JSON to `path`, replacing any existing file atomically
///
/// Serialization failures surface as `io::ErrorKind::InvalidData`.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact.json".to_string());
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let json = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Path of the report file for a domain slug
pub fn report_path(reports_dir: &Path, slug: &str) -> PathBuf {
    reports_dir.join(format!("{}_report.json", slug))
}

/// Persists a finished domain report as `<reports_dir>/<slug>_report.json`
pub fn write_domain_report(reports_dir: &Path, report: &DomainCrawlReport) -> Result<PathBuf, CrawlError> {
    let path = report_path(reports_dir, &report.slug);
    write_json_atomic(&path, report)?;
    tracing::info!("Wrote report for {} to {}", report.domain, path.display());
    Ok(path)
}

/// Persists one extracted page as `<dir>/<slug>/<index:04>_<status>.json`
pub fn save_extracted_page(
    dir: &Path,
    slug: &str,
    index: usize,
    status: Option<u16>,
    page: &ExtractedPage,
) -> Result<PathBuf, CrawlError> {
    let status_part = status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let path = dir.join(slug).join(format!("{:04}_{}.json", index, status_part));
    write_json_atomic(&path, page)?;
    Ok(path)
}
