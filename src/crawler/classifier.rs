//! Link resolution and internal/external classification

use crate::crawler::parser::RawLink;
use crate::scope::CrawlTarget;
use crate::url::canonicalize;
use std::collections::HashSet;
use url::Url;

/// Per-page caps on reported links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkCaps {
    pub internal: usize,
    pub external: usize,
}

/// The links of one page, sorted by where they point
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedLinks {
    /// In-scope links to report and probe, capped
    pub internal: Vec<String>,
    /// Off-site links to report and probe, capped
    pub external: Vec<String>,
    /// In-scope navigational links eligible for the frontier, uncapped
    pub crawlable: Vec<String>,
}

impl ClassifiedLinks {
    /// Internal then external links, the set to probe
    pub fn reported(&self) -> Vec<String> {
        self.internal
            .iter()
            .chain(self.external.iter())
            .cloned()
            .collect()
    }
}

/// Resolves a raw reference against the page URL into a canonical URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only references
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(raw: &str, base: &Url) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }

    let lower = raw.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute = base.join(raw).ok()?;
    canonicalize(absolute).ok()
}

/// Classifies a page's raw links
///
/// Links are resolved against `base` (the page's final URL) and deduplicated
/// by canonical URL. A link is internal when the target admits it: same
/// registrable domain, not under a blocked prefix and, when an allow-list is
/// set, under an allowed prefix. Same-site links rejected by the path rules
/// are dropped rather than reported as external.
pub fn classify_links(
    links: &[RawLink],
    base: &Url,
    target: &CrawlTarget,
    caps: LinkCaps,
) -> ClassifiedLinks {
    let mut classified = ClassifiedLinks::default();
    let mut internal_seen = HashSet::new();
    let mut external_seen = HashSet::new();
    let mut crawlable_seen = HashSet::new();

    for link in links {
        let Some(url) = resolve_link(&link.raw, base) else {
            continue;
        };
        let key = url.to_string();

        if !target.is_same_site(&url) {
            if external_seen.insert(key.clone()) {
                classified.external.push(key);
            }
            continue;
        }

        if !target.admits(&url) {
            continue;
        }

        if link.source.is_navigational() && crawlable_seen.insert(key.clone()) {
            classified.crawlable.push(key.clone());
        }
        if internal_seen.insert(key.clone()) {
            classified.internal.push(key);
        }
    }

    classified.internal.truncate(caps.internal);
    classified.external.truncate(caps.external);
    classified
}
