use url::{Host, Url};

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use onpage_crawl::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the registrable domain of a URL: the public suffix plus one label
///
/// `blog.example.com` and `example.com` both map to `example.com`, and
/// `shop.example.co.uk` maps to `example.co.uk`. IP addresses and hosts that
/// have no label under a public suffix (such as `localhost`) are their own
/// registrable domain.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use onpage_crawl::url::registrable_domain;
///
/// let url = Url::parse("https://blog.example.com/post").unwrap();
/// assert_eq!(registrable_domain(&url), Some("example.com".to_string()));
/// ```
pub fn registrable_domain(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string()),
        Host::Domain(host) => Some(registrable_host(host)),
    }
}

/// Registrable domain of a bare host name
pub fn registrable_host(host: &str) -> String {
    let host = host.trim_end_matches('.').to_lowercase();
    psl::domain_str(&host)
        .map(str::to_string)
        .unwrap_or(host)
}
