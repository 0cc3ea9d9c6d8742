use serde::{Deserialize, Serialize};

/// Desktop browser user agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36";

/// Main configuration structure for Onpage-Crawl
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub limits: LimitsConfig,
    pub output: OutputConfig,
}

/// HTTP client behavior
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// User agent header sent with every request
    pub user_agent: String,

    /// Timeout for a full page fetch (seconds)
    pub timeout_secs: u64,

    /// Extra attempts after a network error
    pub retries: u32,

    /// Optional proxy URL applied to all requests
    pub proxy: Option<String>,

    /// Timeout for a single link-status probe (seconds)
    pub probe_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 25,
            retries: 2,
            proxy: None,
            probe_timeout_secs: 10,
        }
    }
}

/// Crawl budget and per-page limits
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LimitsConfig {
    /// Page budget used when a target does not carry its own
    pub max_pages_per_domain: usize,

    /// Pause between consecutive page fetches (milliseconds)
    pub delay_ms_between_requests: u64,

    /// Internal links probed and reported per page
    pub max_internal_links: usize,

    /// External links probed and reported per page
    pub max_external_links: usize,

    /// Concurrent probes within one page's batch
    pub probe_concurrency: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_pages_per_domain: 20,
            delay_ms_between_requests: 0,
            max_internal_links: 30,
            max_external_links: 10,
            probe_concurrency: 5,
        }
    }
}

/// Where crawl artifacts are written
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory receiving one `<slug>_report.json` per crawled domain
    pub reports_dir: String,

    /// Job status document, overwritten on every job transition
    pub status_path: String,

    /// When set, every extracted page is persisted below this directory
    pub extracted_dir: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            reports_dir: "data/reports".to_string(),
            status_path: "data/cache/crawl_status.json".to_string(),
            extracted_dir: None,
        }
    }
}
