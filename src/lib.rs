//! Onpage-Crawl: a single-domain breadth-first crawl engine
//!
//! This crate crawls one web domain at a time starting from seed URLs, extracts
//! indexing directives and links from each page, probes the HTTP status of the
//! links it finds, and produces a per-domain report. Crawls run inside jobs whose
//! lifecycle is persisted so a separate reader can observe progress.

pub mod config;
pub mod crawler;
pub mod job;
pub mod output;
pub mod scope;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid crawl target: {0}")]
    InvalidTarget(String),

    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Extraction failed for {url}: {message}")]
    ExtractionFailed { url: String, message: String },

    #[error("Probe failed for {url}: {reason}")]
    ProbeFailed { url: String, reason: String },

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Invalid job transition: {from} -> {to}")]
    InvalidTransition {
        from: state::JobStatus,
        to: state::JobStatus,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use job::{CrawlJob, JobRunner};
pub use output::{DomainCrawlReport, IndexStatus, LinkRecord, PageCrawlResult};
pub use scope::{resolve_target, CrawlRequest, CrawlTarget, DomainInput};
pub use state::JobStatus;
pub use crate::url::{canonicalize_url, registrable_domain};
