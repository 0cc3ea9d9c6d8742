//! Report data model and its JSON wire shape

use crate::config::{Config, HttpConfig, LimitsConfig};
use crate::crawler::FetchMeta;
use crate::scope::CrawlTarget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `error` value for pages whose fetch failed
pub const FETCH_FAILED: &str = "fetch_failed";

/// `error` value for pages whose HTML could not be extracted
pub const EXTRACTION_FAILED: &str = "extraction_failed";

/// Indexing directive derived from a page's meta robots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexStatus {
    Index,
    Noindex,
    #[default]
    Unknown,
}

impl IndexStatus {
    /// Derives the index status from a meta robots directive
    ///
    /// - contains `noindex` (any case) → `Noindex`
    /// - any other non-empty directive → `Index`
    /// - absent or blank → `Unknown`
    ///
    /// # Examples
    ///
    /// ```
    /// use onpage_crawl::IndexStatus;
    ///
    /// assert_eq!(IndexStatus::from_meta_robots(Some("NOINDEX, follow")), IndexStatus::Noindex);
    /// assert_eq!(IndexStatus::from_meta_robots(Some("index,follow")), IndexStatus::Index);
    /// assert_eq!(IndexStatus::from_meta_robots(None), IndexStatus::Unknown);
    /// ```
    pub fn from_meta_robots(meta_robots: Option<&str>) -> Self {
        match meta_robots.map(str::trim) {
            Some(robots) if robots.to_lowercase().contains("noindex") => Self::Noindex,
            Some(robots) if !robots.is_empty() => Self::Index,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Noindex => "noindex",
            Self::Unknown => "unknown",
        }
    }
}

/// Probed HTTP status of one absolute link
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkRecord {
    pub url: String,
    pub status: Option<u16>,
}

/// Outcome of crawling one URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageCrawlResult {
    pub url: String,
    #[serde(default)]
    pub final_url: String,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub encoding_guess: Option<String>,
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub meta_robots: Option<String>,
    #[serde(default)]
    pub index_status: IndexStatus,
    #[serde(default)]
    pub internal_links: Vec<LinkRecord>,
    #[serde(default)]
    pub external_links: Vec<LinkRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_path: Option<String>,
}

impl PageCrawlResult {
    /// A page whose fetch returned a response, before extraction
    pub fn from_fetch(url: &str, meta: &FetchMeta, ok: bool) -> Self {
        Self {
            url: url.to_string(),
            final_url: meta.final_url.clone(),
            status: meta.status,
            duration_ms: meta.duration_ms,
            size_bytes: meta.size_bytes,
            encoding_guess: meta.encoding_guess.clone(),
            ok,
            error: None,
            meta_robots: None,
            index_status: IndexStatus::Unknown,
            internal_links: Vec::new(),
            external_links: Vec::new(),
            extracted_path: None,
        }
    }

    /// A page whose fetch produced no usable response at all
    pub fn unreachable(url: &str) -> Self {
        let meta = FetchMeta {
            final_url: url.to_string(),
            ..FetchMeta::default()
        };
        Self::from_fetch(url, &meta, false).with_error(FETCH_FAILED)
    }

    /// Marks the page as failed with the given error kind
    pub fn with_error(mut self, error: &str) -> Self {
        self.ok = false;
        self.error = Some(error.to_string());
        self
    }
}

/// Settings a domain crawl actually ran with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub http: HttpConfig,
    pub limits: LimitsConfig,
    pub max_pages_effective: usize,
}

/// Full result of crawling one domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainCrawlReport {
    pub domain: String,
    pub slug: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub config: EffectiveConfig,
    pub pages: Vec<PageCrawlResult>,
}

impl DomainCrawlReport {
    /// Starts an empty report for the target
    pub fn begin(target: &CrawlTarget, config: &Config) -> Self {
        let now = Utc::now();
        Self {
            domain: target.domain.clone(),
            slug: target.slug.clone(),
            started_at: now,
            finished_at: now,
            duration_ms: 0,
            config: EffectiveConfig {
                http: config.http.clone(),
                limits: config.limits.clone(),
                max_pages_effective: target.max_pages,
            },
            pages: Vec::new(),
        }
    }

    /// Stamps the finish time and duration
    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
        self.duration_ms = (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64;
    }

    /// Converts into the job wire shape, pointing at the persisted report file
    pub fn into_job_report(self, report_path: String) -> DomainReport {
        DomainReport {
            domain: self.domain,
            slug: self.slug,
            duration_ms: self.duration_ms,
            report_path,
            pages: self.pages,
        }
    }
}

/// One domain's report as exposed on a crawl job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainReport {
    pub domain: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub report_path: String,
    #[serde(default)]
    pub pages: Vec<PageCrawlResult>,
}
