//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with browser-like default headers
//! - GET requests for page content, with retries on network failures
//! - HEAD status probes for discovered links
//! - Recording the encoding each fetched body decodes with

use crate::config::HttpConfig;
use crate::crawler::encoding::{charset_from_content_type, detect_encoding};
use crate::CrawlError;
use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_TYPE, PRAGMA,
};
use reqwest::{redirect::Policy, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(4);
const MAX_REDIRECTS: usize = 10;

/// Response metadata recorded for every fetched page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchMeta {
    /// HTTP status code of the final response
    pub status: Option<u16>,
    /// URL after following redirects
    pub final_url: String,
    /// Wall time from the first attempt to the end of the body
    pub duration_ms: u64,
    /// Body length in bytes
    pub size_bytes: u64,
    /// Encoding the body decodes with: BOM, declared charset, meta charset, then detection
    pub encoding_guess: Option<String>,
}

/// A fetched page
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// True for statuses in [200, 400)
    pub ok: bool,
    pub meta: FetchMeta,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Builds a response, deriving `ok`, size and encoding guess from status and body
    pub fn new(status: u16, final_url: impl Into<String>, duration_ms: u64, body: Vec<u8>) -> Self {
        let encoding_guess = detect_encoding(&body, None);
        Self::with_encoding(status, final_url, duration_ms, body, encoding_guess)
    }

    fn with_encoding(
        status: u16,
        final_url: impl Into<String>,
        duration_ms: u64,
        body: Vec<u8>,
        encoding_guess: Option<String>,
    ) -> Self {
        Self {
            ok: is_ok_status(status),
            meta: FetchMeta {
                status: Some(status),
                final_url: final_url.into(),
                duration_ms,
                size_bytes: body.len() as u64,
                encoding_guess,
            },
            body,
        }
    }
}

/// Whether a status counts as a successful page fetch
pub fn is_ok_status(status: u16) -> bool {
    (200..400).contains(&status)
}

/// Network access used by the crawler
///
/// Implementations must be shareable across the concurrent probe workers.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches a page body following redirects
    ///
    /// Returns `Err(CrawlError::FetchFailed)` only when no response could be
    /// obtained at all; HTTP error statuses come back as a response with
    /// `ok == false`.
    async fn fetch_page(&self, url: &str) -> Result<FetchResponse, CrawlError>;

    /// Returns the HTTP status of a link without downloading its body
    async fn probe_status(&self, url: &str) -> Result<u16, CrawlError>;
}

/// Builds an HTTP client with browser-like defaults
///
/// # Arguments
///
/// * `config` - The HTTP configuration (user agent, proxy)
/// * `timeout` - Overall request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client, e.g. a malformed proxy
///
/// # Example
///
/// ```no_run
/// use onpage_crawl::config::HttpConfig;
/// use onpage_crawl::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&HttpConfig::default(), Duration::from_secs(25)).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = config.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }

    builder.build()
}

/// Fetcher backed by reqwest
///
/// Holds two clients: one with the page timeout and one with the shorter
/// probe timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    page_client: Client,
    probe_client: Client,
    retries: u32,
}

impl HttpFetcher {
    /// Creates a fetcher from the HTTP configuration
    pub fn new(config: &HttpConfig) -> Result<Self, CrawlError> {
        let page_client = build_http_client(config, Duration::from_secs(config.timeout_secs))?;
        let probe_client = build_http_client(config, Duration::from_secs(config.probe_timeout_secs))?;

        Ok(Self {
            page_client,
            probe_client,
            retries: config.retries,
        })
    }

    async fn try_fetch(&self, url: &str, started: Instant) -> Result<FetchResponse, reqwest::Error> {
        let response = self.page_client.get(url).send().await?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let declared = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type);

        let body = response.bytes().await?.to_vec();
        let duration_ms = started.elapsed().as_millis() as u64;
        let encoding_guess = detect_encoding(&body, declared.as_deref());

        Ok(FetchResponse::with_encoding(
            status,
            final_url,
            duration_ms,
            body,
            encoding_guess,
        ))
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    /// Fetches a URL, retrying network failures with exponential backoff
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Any HTTP status | Returned as-is, no retry |
    /// | Timeout / connection / body error | Retry up to `retries` times |
    /// | Retries exhausted | `FetchFailed` |
    ///
    /// Backoff starts at 0.5s and doubles up to 4s.
    async fn fetch_page(&self, url: &str) -> Result<FetchResponse, CrawlError> {
        let started = Instant::now();
        let mut backoff = INITIAL_BACKOFF;
        let mut attempt = 0;

        loop {
            match self.try_fetch(url, started).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!(
                        "Fetch attempt {} for {} failed ({}), retrying in {:?}",
                        attempt,
                        url,
                        describe_error(&e),
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
                Err(e) => {
                    return Err(CrawlError::FetchFailed {
                        url: url.to_string(),
                        reason: describe_error(&e),
                    })
                }
            }
        }
    }

    /// HEAD probe, falling back to GET when the server rejects HEAD
    async fn probe_status(&self, url: &str) -> Result<u16, CrawlError> {
        let probe_failed = |e: reqwest::Error| CrawlError::ProbeFailed {
            url: url.to_string(),
            reason: describe_error(&e),
        };

        let response = self.probe_client.head(url).send().await.map_err(probe_failed)?;
        let status = response.status();

        if status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::NOT_IMPLEMENTED {
            let response = self.probe_client.get(url).send().await.map_err(probe_failed)?;
            return Ok(response.status().as_u16());
        }

        Ok(status.as_u16())
    }
}

/// Short classification of a reqwest error
fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        "connection failed".to_string()
    } else if e.is_redirect() {
        "too many redirects".to_string()
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> HttpConfig {
        HttpConfig {
            retries: 0,
            ..HttpConfig::default()
        }
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&HttpConfig::default(), Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_http_client_with_proxy() {
        let config = HttpConfig {
            proxy: Some("http://127.0.0.1:3128".to_string()),
            ..HttpConfig::default()
        };
        assert!(build_http_client(&config, Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_is_ok_status() {
        assert!(is_ok_status(200));
        assert!(is_ok_status(301));
        assert!(is_ok_status(399));
        assert!(!is_ok_status(404));
        assert!(!is_ok_status(500));
        assert!(!is_ok_status(199));
    }

    #[test]
    fn test_response_derives_meta() {
        let response = FetchResponse::new(404, "https://example.com/x", 12, b"gone".to_vec());
        assert!(!response.ok);
        assert_eq!(response.meta.status, Some(404));
        assert_eq!(response.meta.size_bytes, 4);
        assert_eq!(response.meta.duration_ms, 12);
    }

    #[tokio::test]
    async fn test_fetch_page_records_meta() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>hi</body></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let response = fetcher.fetch_page(&format!("{}/", server.uri())).await.unwrap();

        assert!(response.ok);
        assert_eq!(response.meta.status, Some(200));
        assert_eq!(response.meta.final_url, format!("{}/", server.uri()));
        assert_eq!(response.meta.size_bytes, 28);
        assert_eq!(response.meta.encoding_guess.as_deref(), Some("utf-8"));
    }

    #[tokio::test]
    async fn test_fetch_page_declared_charset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/header"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"<p>\xa3\xf3d\x9f</p>".to_vec(), "text/html; charset=windows-1250"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/meta"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"<meta charset=\"koi8-r\"><p>\xf0\xd2\xc9</p>".to_vec(), "text/html"),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let header = fetcher.fetch_page(&format!("{}/header", server.uri())).await.unwrap();
        let meta = fetcher.fetch_page(&format!("{}/meta", server.uri())).await.unwrap();

        assert_eq!(header.meta.encoding_guess.as_deref(), Some("windows-1250"));
        assert_eq!(meta.meta.encoding_guess.as_deref(), Some("koi8-r"));
    }

    #[tokio::test]
    async fn test_fetch_page_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("location", format!("{}/new", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>new</p>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let response = fetcher.fetch_page(&format!("{}/old", server.uri())).await.unwrap();

        assert_eq!(response.meta.status, Some(200));
        assert_eq!(response.meta.final_url, format!("{}/new", server.uri()));
    }

    #[tokio::test]
    async fn test_fetch_page_error_status_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let response = fetcher.fetch_page(&server.uri()).await.unwrap();
        assert!(!response.ok);
        assert_eq!(response.meta.status, Some(500));
    }

    #[tokio::test]
    async fn test_fetch_page_unreachable() {
        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let result = fetcher.fetch_page("http://127.0.0.1:1/").await;
        assert!(matches!(result, Err(CrawlError::FetchFailed { .. })));
    }

    #[tokio::test]
    async fn test_probe_uses_head() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let status = fetcher.probe_status(&format!("{}/page", server.uri())).await.unwrap();
        assert_eq!(status, 204);
    }

    #[tokio::test]
    async fn test_probe_falls_back_to_get() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(405))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let status = fetcher.probe_status(&server.uri()).await.unwrap();
        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn test_probe_unreachable() {
        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let result = fetcher.probe_status("http://127.0.0.1:1/").await;
        assert!(matches!(result, Err(CrawlError::ProbeFailed { .. })));
    }
}
