//! Link status probing with a per-crawl cache
//!
//! Each distinct URL is probed at most once per domain crawl. A batch of
//! uncached URLs is probed concurrently, bounded by the configured
//! concurrency, and results (including failures, cached as `None`) are merged
//! into the cache once the whole batch has joined.

use crate::crawler::fetcher::Fetch;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Probed status per URL; `None` when the probe failed
pub type StatusMap = HashMap<String, Option<u16>>;

pub struct LinkProber {
    fetcher: Arc<dyn Fetch>,
    concurrency: usize,
    cache: StatusMap,
    probes_issued: usize,
}

impl LinkProber {
    pub fn new(fetcher: Arc<dyn Fetch>, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
            cache: HashMap::new(),
            probes_issued: 0,
        }
    }

    /// Returns the status of every URL in `urls`, probing only the uncached ones
    pub async fn probe_batch(&mut self, urls: &[String]) -> StatusMap {
        let mut pending = Vec::new();
        let mut scheduled = HashSet::new();
        for url in urls {
            if !self.cache.contains_key(url) && scheduled.insert(url.as_str()) {
                pending.push(url.clone());
            }
        }

        if !pending.is_empty() {
            tracing::debug!(
                "Probing {} link(s) ({} cached)",
                pending.len(),
                urls.len() - pending.len()
            );

            let fetcher = Arc::clone(&self.fetcher);
            let results: Vec<(String, Option<u16>)> = stream::iter(pending)
                .map(|url| {
                    let fetcher = Arc::clone(&fetcher);
                    async move {
                        let status = match fetcher.probe_status(&url).await {
                            Ok(status) => Some(status),
                            Err(e) => {
                                tracing::debug!("Probe failed: {}", e);
                                None
                            }
                        };
                        (url, status)
                    }
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

            self.probes_issued += results.len();
            self.cache.extend(results);
        }

        urls.iter()
            .map(|url| (url.clone(), self.cached(url).flatten()))
            .collect()
    }

    /// Cached status of a URL; outer `None` when it was never probed
    pub fn cached(&self, url: &str) -> Option<Option<u16>> {
        self.cache.get(url).copied()
    }

    /// Number of network probes issued so far
    pub fn probes_issued(&self) -> usize {
        self.probes_issued
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}
