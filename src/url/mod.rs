//! URL handling module for Onpage-Crawl
//!
//! This module provides URL canonicalization (the frontier's dedup key),
//! registrable-domain extraction for internal/external classification, and
//! path-prefix matching for scope rules.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, registrable_domain, registrable_host};
pub use matcher::{matches_any_prefix, matches_path_prefix};
pub use normalize::{canonicalize, canonicalize_url};

use url::Url;

/// Returns true if both URLs share a registrable domain
///
/// # Examples
///
/// ```
/// use url::Url;
/// use onpage_crawl::url::same_registrable_domain;
///
/// let a = Url::parse("https://blog.example.com/").unwrap();
/// let b = Url::parse("https://example.com/about").unwrap();
/// assert!(same_registrable_domain(&a, &b));
/// ```
pub fn same_registrable_domain(a: &Url, b: &Url) -> bool {
    match (registrable_domain(a), registrable_domain(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
