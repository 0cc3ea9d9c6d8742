//! Crawler module for single-domain BFS crawls
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic and status probing
//! - HTML extraction of meta robots and raw links
//! - Link resolution and internal/external classification
//! - The budgeted BFS frontier and the crawl loop driving it

mod classifier;
mod coordinator;
mod encoding;
mod fetcher;
mod frontier;
mod parser;
mod prober;

pub use classifier::{classify_links, resolve_link, ClassifiedLinks, LinkCaps};
pub use coordinator::DomainCrawler;
pub use encoding::{charset_from_content_type, detect_encoding, sniff_encoding};
pub use fetcher::{build_http_client, is_ok_status, Fetch, FetchMeta, FetchResponse, HttpFetcher};
pub use frontier::{EnqueueOutcome, Frontier, FrontierState};
pub use parser::{
    parse_html, Extract, ExtractedPage, HtmlExtractor, ImageRef, LinkSource, RawLink,
};
pub use prober::{LinkProber, StatusMap};
