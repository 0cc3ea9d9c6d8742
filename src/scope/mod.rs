//! Scope resolution for domain crawls
//!
//! This module turns loosely specified domain inputs (a bare domain, a crawl
//! request, or an entry from a domain list file) into an immutable
//! [`CrawlTarget`]: canonical seed URLs, a slug, a page budget and the path
//! rules that decide which discovered links may be crawled.

mod inputs;
mod target;

pub use inputs::{load_domain_inputs, parse_domain_inputs, CrawlRequest, DomainInput};
pub use target::{resolve_target, slug_from_domain, CrawlTarget};
