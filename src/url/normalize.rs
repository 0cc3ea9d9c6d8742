use crate::UrlError;
use url::Url;

/// Canonicalizes a URL into the form used as the crawl's dedup key
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not HTTP or HTTPS
/// 3. Require a host (the parser already lowercases it and drops default ports)
/// 4. Remove dot segments from the path (done by the parser)
/// 5. Remove fragment (everything after #)
/// 6. Sort query parameters by key, keeping the relative order of equal keys
/// 7. Remove empty query string (trailing ?)
///
/// Query parameters are reordered as written: their encoding is left alone, so
/// `?a` stays `?a` and `%20` stays `%20`.
///
/// Scheme, `www.` prefix and trailing slashes are preserved: they can address
/// different documents on real sites.
///
/// # Examples
///
/// ```
/// use onpage_crawl::url::canonicalize_url;
///
/// let url = canonicalize_url("https://EXAMPLE.com/page?b=2&a=1#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page?a=1&b=2");
/// ```
pub fn canonicalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(url)
}

/// Canonicalizes an already parsed URL
pub fn canonicalize(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    if let Some(query) = url.query() {
        let query = sorted_query(query);
        url.set_query((!query.is_empty()).then_some(query.as_str()));
    }

    Ok(url)
}

/// Reorders raw `&`-separated query segments by key (stable for repeated keys)
///
/// Segments with an empty key are dropped.
fn sorted_query(query: &str) -> String {
    let mut segments: Vec<&str> = query
        .split('&')
        .filter(|segment| !query_key(segment).is_empty())
        .collect();
    segments.sort_by(|a, b| query_key(a).cmp(query_key(b)));

    segments.join("&")
}

fn query_key(segment: &str) -> &str {
    segment.split('=').next().unwrap_or_default()
}
