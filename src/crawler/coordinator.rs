//! Crawler coordinator - the per-domain BFS crawl loop
//!
//! This module drives one domain crawl from seeds to a finished report:
//! - Seeding the frontier from the target's seed URLs
//! - Fetching and extracting one page at a time, in discovery order
//! - Classifying and probing each page's links
//! - Feeding in-scope navigational links back into the frontier
//!
//! Page-level failures never abort the crawl; they are recorded on the page.

use crate::config::Config;
use crate::crawler::classifier::{classify_links, LinkCaps};
use crate::crawler::fetcher::{Fetch, HttpFetcher};
use crate::crawler::frontier::{EnqueueOutcome, Frontier};
use crate::crawler::parser::{Extract, ExtractedPage, HtmlExtractor};
use crate::crawler::prober::{LinkProber, StatusMap};
use crate::output::{
    save_extracted_page, DomainCrawlReport, LinkRecord, PageCrawlResult, EXTRACTION_FAILED,
    FETCH_FAILED,
};
use crate::scope::CrawlTarget;
use crate::url::canonicalize_url;
use crate::CrawlError;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Crawls single domains with shared configuration and collaborators
///
/// Cloning is cheap; each [`crawl`](Self::crawl) call owns its own frontier,
/// probe cache and report.
#[derive(Clone)]
pub struct DomainCrawler {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetch>,
    extractor: Arc<dyn Extract>,
}

impl DomainCrawler {
    /// Creates a crawler backed by reqwest and scraper
    ///
    /// # Returns
    ///
    /// * `Ok(DomainCrawler)` - Ready to crawl
    /// * `Err(CrawlError)` - The HTTP clients could not be built
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        let fetcher = HttpFetcher::new(&config.http)?;
        Ok(Self::with_collaborators(
            config,
            Arc::new(fetcher),
            Arc::new(HtmlExtractor),
        ))
    }

    /// Creates a crawler with custom fetch and extraction collaborators
    pub fn with_collaborators(
        config: Config,
        fetcher: Arc<dyn Fetch>,
        extractor: Arc<dyn Extract>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
            extractor,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Crawls a target breadth-first until its queue empties or its budget is spent
    pub async fn crawl(&self, target: &CrawlTarget) -> DomainCrawlReport {
        CrawlRun::new(self, target).execute().await
    }
}

/// State of one domain crawl
struct CrawlRun<'a> {
    crawler: &'a DomainCrawler,
    target: &'a CrawlTarget,
    frontier: Frontier,
    prober: LinkProber,
    report: DomainCrawlReport,
}

impl<'a> CrawlRun<'a> {
    fn new(crawler: &'a DomainCrawler, target: &'a CrawlTarget) -> Self {
        let mut frontier = Frontier::new(target.max_pages);
        for seed in &target.seed_urls {
            match Url::parse(seed) {
                Ok(url) if target.admits_seed(&url) => {
                    frontier.seed(seed.as_str());
                }
                _ => tracing::warn!("Seed {} is outside the scope of {}", seed, target.domain),
            }
        }

        Self {
            crawler,
            target,
            frontier,
            prober: LinkProber::new(
                Arc::clone(&crawler.fetcher),
                crawler.config.limits.probe_concurrency,
            ),
            report: DomainCrawlReport::begin(target, &crawler.config),
        }
    }

    async fn execute(mut self) -> DomainCrawlReport {
        tracing::info!(
            "Starting crawl of {} ({} seed(s), budget {} page(s))",
            self.target.domain,
            self.frontier.len(),
            self.target.max_pages
        );

        let delay = Duration::from_millis(self.crawler.config.limits.delay_ms_between_requests);
        let start_time = Instant::now();

        while let Some(url) = self.frontier.next_url() {
            if !self.report.pages.is_empty() && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            tracing::debug!("Processing URL: {}", url);
            let page = self.crawl_page(&url).await;
            self.report.pages.push(page);

            let pages_crawled = self.report.pages.len();
            if pages_crawled % 10 == 0 {
                let rate = pages_crawled as f64 / start_time.elapsed().as_secs_f64().max(0.001);
                tracing::info!(
                    "Progress: {} pages crawled, {} in frontier, {:.2} pages/sec",
                    pages_crawled,
                    self.frontier.len(),
                    rate
                );
            }
        }

        self.report.finish();
        tracing::info!(
            "Finished crawl of {}: {} page(s), {} link probe(s) in {} ms",
            self.target.domain,
            self.report.pages.len(),
            self.prober.probes_issued(),
            self.report.duration_ms
        );

        self.report
    }

    /// Fetches, extracts, classifies and probes one page
    async fn crawl_page(&mut self, url: &str) -> PageCrawlResult {
        let response = match self.crawler.fetcher.fetch_page(url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("{}", e);
                return PageCrawlResult::unreachable(url);
            }
        };

        self.mark_redirect_target(url, &response.meta.final_url);

        if !response.ok || response.body.is_empty() {
            tracing::warn!(
                "Fetch failed for {} (status {:?}, {} bytes)",
                url,
                response.meta.status,
                response.meta.size_bytes
            );
            return PageCrawlResult::from_fetch(url, &response.meta, false).with_error(FETCH_FAILED);
        }

        let page = PageCrawlResult::from_fetch(url, &response.meta, true);

        let extracted = match self
            .crawler
            .extractor
            .extract(
                &response.body,
                &response.meta.final_url,
                response.meta.encoding_guess.as_deref(),
            )
        {
            Ok(extracted) => extracted,
            Err(e) => {
                tracing::warn!("{}", e);
                return page.with_error(EXTRACTION_FAILED);
            }
        };

        self.expand(page, &extracted, url).await
    }

    /// Fills in robots, links and probe results, and grows the frontier
    async fn expand(
        &mut self,
        mut page: PageCrawlResult,
        extracted: &ExtractedPage,
        url: &str,
    ) -> PageCrawlResult {
        page.meta_robots = extracted.meta_robots.clone();
        page.index_status = extracted.index_status();
        page.extracted_path = self.save_extracted(extracted, page.status);

        let base = match Url::parse(&page.final_url).or_else(|_| Url::parse(url)) {
            Ok(base) => base,
            Err(_) => return page,
        };

        let limits = &self.crawler.config.limits;
        let caps = LinkCaps {
            internal: limits.max_internal_links,
            external: limits.max_external_links,
        };
        let classified = classify_links(&extracted.links, &base, self.target, caps);

        let statuses = self.prober.probe_batch(&classified.reported()).await;
        page.internal_links = link_records(&classified.internal, &statuses);
        page.external_links = link_records(&classified.external, &statuses);

        let mut queued = 0;
        for link in &classified.crawlable {
            match self.frontier.enqueue(link) {
                EnqueueOutcome::Queued => queued += 1,
                EnqueueOutcome::AlreadyKnown => {}
                EnqueueOutcome::BudgetFull | EnqueueOutcome::Closed => break,
            }
        }

        tracing::debug!(
            "{}: {} internal, {} external link(s), {} queued",
            url,
            page.internal_links.len(),
            page.external_links.len(),
            queued
        );

        page
    }

    /// Marks the post-redirect URL as crawled so it is not fetched again
    fn mark_redirect_target(&mut self, url: &str, final_url: &str) {
        if let Ok(canonical) = canonicalize_url(final_url) {
            if canonical.as_str() != url {
                self.frontier.mark_seen(canonical.as_str());
            }
        }
    }

    /// Persists the extracted page when an extraction directory is configured
    fn save_extracted(&self, extracted: &ExtractedPage, status: Option<u16>) -> Option<String> {
        let dir = self.crawler.config.output.extracted_dir.as_deref()?;
        let index = self.report.pages.len();

        match save_extracted_page(Path::new(dir), &self.target.slug, index, status, extracted) {
            Ok(path) => Some(path.display().to_string()),
            Err(e) => {
                tracing::warn!("Could not save extracted page {}: {}", extracted.final_url, e);
                None
            }
        }
    }
}

fn link_records(urls: &[String], statuses: &StatusMap) -> Vec<LinkRecord> {
    urls.iter()
        .map(|url| LinkRecord {
            url: url.clone(),
            status: statuses.get(url).copied().flatten(),
        })
        .collect()
}
