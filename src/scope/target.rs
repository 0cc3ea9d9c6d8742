use crate::scope::inputs::DomainInput;
use crate::url::{canonicalize_url, matches_any_prefix, registrable_domain};
use crate::CrawlError;
use serde::{Deserialize, Serialize};
use url::Url;

/// Slug used when nothing identifier-like survives sanitizing a domain
const FALLBACK_SLUG: &str = "domain";

/// A resolved, immutable description of one domain crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlTarget {
    /// Domain as requested (with or without scheme)
    pub domain: String,

    /// Filesystem-safe identifier derived from the domain
    pub slug: String,

    /// Canonical seed URLs, deduplicated in first-seen order
    pub seed_urls: Vec<String>,

    /// Page budget for this crawl (always >= 1)
    pub max_pages: usize,

    /// When non-empty, discovered links must fall under one of these paths
    pub allowed_path_prefixes: Vec<String>,

    /// Discovered links and seeds under these paths are never crawled
    pub blocked_path_prefixes: Vec<String>,

    /// Registrable domain every internal link must share
    pub registrable_domain: String,
}

impl CrawlTarget {
    /// Returns true if the URL belongs to this target's registrable domain
    pub fn is_same_site(&self, url: &Url) -> bool {
        registrable_domain(url).as_deref() == Some(self.registrable_domain.as_str())
    }

    /// Returns true if a blocked prefix matches the URL path
    pub fn is_blocked(&self, url: &Url) -> bool {
        matches_any_prefix(&self.blocked_path_prefixes, url.path())
    }

    /// Returns true if the allow-list is empty or one of its prefixes matches
    pub fn is_allowed(&self, url: &Url) -> bool {
        self.allowed_path_prefixes.is_empty()
            || matches_any_prefix(&self.allowed_path_prefixes, url.path())
    }

    /// Scope filter for discovered links: host match, block-list, allow-list
    pub fn admits(&self, url: &Url) -> bool {
        self.is_same_site(url) && !self.is_blocked(url) && self.is_allowed(url)
    }

    /// Scope filter for seeds: the allow-list only governs discovered links
    pub fn admits_seed(&self, url: &Url) -> bool {
        self.is_same_site(url) && !self.is_blocked(url)
    }
}

/// Resolves a domain input into a crawl target
///
/// # Resolution Rules
///
/// 1. Seeds come from `start_urls`, or the domain's root URL when none are given
/// 2. Seeds without a scheme get `https://`; bare hosts get a trailing `/`
/// 3. Seeds are canonicalized and deduplicated, keeping first-seen order
/// 4. The slug is the explicit one, or one derived from the domain
/// 5. The budget is the input's positive `max_pages`, else `default_max_pages`
///
/// # Returns
///
/// * `Ok(CrawlTarget)` - At least one usable seed URL was derived
/// * `Err(CrawlError::InvalidTarget)` - No usable seed URL could be derived
///
/// # Example
///
/// ```
/// use onpage_crawl::scope::{resolve_target, DomainInput};
///
/// let target = resolve_target(&DomainInput::new("Example.com"), 20).unwrap();
/// assert_eq!(target.seed_urls, vec!["https://example.com/".to_string()]);
/// assert_eq!(target.slug, "example_com");
/// ```
pub fn resolve_target(input: &DomainInput, default_max_pages: usize) -> Result<CrawlTarget, CrawlError> {
    let mut domain = input.domain.trim().to_string();

    let raw_seeds: Vec<String> = if input.start_urls.is_empty() {
        if domain.is_empty() {
            Vec::new()
        } else {
            vec![root_url(&domain)]
        }
    } else {
        input.start_urls.iter().map(|u| with_scheme(u)).collect()
    };

    let mut seed_urls: Vec<String> = Vec::new();
    for raw in &raw_seeds {
        match canonicalize_url(raw) {
            Ok(url) => {
                let url = url.to_string();
                if !seed_urls.contains(&url) {
                    seed_urls.push(url);
                }
            }
            Err(e) => tracing::debug!("Dropping unusable seed {}: {}", raw, e),
        }
    }

    let first_seed = match seed_urls.first() {
        Some(seed) => Url::parse(seed)?,
        None => {
            return Err(CrawlError::InvalidTarget(format!(
                "no usable seed URL for domain '{}'",
                input.domain
            )))
        }
    };

    if domain.is_empty() {
        domain = first_seed.to_string();
    }

    // Scope is anchored on the requested domain; fall back to the first seed
    let registrable = canonicalize_url(&root_url(&domain))
        .ok()
        .and_then(|url| registrable_domain(&url))
        .or_else(|| registrable_domain(&first_seed))
        .ok_or_else(|| {
            CrawlError::InvalidTarget(format!("no host in domain '{}'", input.domain))
        })?;

    let slug = input
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| slug_from_domain(&domain));

    let max_pages = input
        .max_pages
        .filter(|n| *n > 0)
        .unwrap_or(default_max_pages)
        .max(1);

    Ok(CrawlTarget {
        domain,
        slug,
        seed_urls,
        max_pages,
        allowed_path_prefixes: dedup_prefixes(&input.allowed_paths),
        blocked_path_prefixes: dedup_prefixes(&input.blocked_paths),
        registrable_domain: registrable,
    })
}

/// Derives a filesystem-safe slug from a domain
///
/// The scheme and surrounding slashes are stripped, the rest is lower-cased
/// and every non-alphanumeric character becomes `_`.
///
/// # Examples
///
/// ```
/// use onpage_crawl::scope::slug_from_domain;
///
/// assert_eq!(slug_from_domain("https://Blog.Example.com/"), "blog_example_com");
/// assert_eq!(slug_from_domain("///"), "domain");
/// ```
pub fn slug_from_domain(domain: &str) -> String {
    let lowered = domain.trim().to_lowercase();
    let bare = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered)
        .trim_matches('/');

    let slug: String = bare
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let slug = slug.trim_matches('_');

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Adds `https://` when the input has no HTTP scheme
fn with_scheme(raw: &str) -> String {
    let raw = raw.trim();
    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw.trim_start_matches('/'))
    }
}

/// Full root URL for a domain, always ending in `/`
fn root_url(domain: &str) -> String {
    let mut root = with_scheme(domain);
    if !root.ends_with('/') {
        root.push('/');
    }
    root
}

fn dedup_prefixes(prefixes: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for prefix in prefixes.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        if !out.iter().any(|p| p == prefix) {
            out.push(prefix.to_string());
        }
    }
    out
}
