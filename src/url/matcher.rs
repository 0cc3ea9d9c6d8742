/// Checks if a URL path starts with the given prefix
///
/// Matching is literal and case-sensitive. An empty prefix never matches, so a
/// stray empty entry in a block-list cannot block a whole site.
///
/// # Examples
///
/// ```
/// use onpage_crawl::url::matches_path_prefix;
///
/// assert!(matches_path_prefix("/blog/", "/blog/post-1"));
/// assert!(!matches_path_prefix("/blog/", "/about"));
/// assert!(!matches_path_prefix("", "/anything"));
/// ```
pub fn matches_path_prefix(prefix: &str, path: &str) -> bool {
    !prefix.is_empty() && path.starts_with(prefix)
}

/// Returns true if any prefix in the list matches the path
pub fn matches_any_prefix<S: AsRef<str>>(prefixes: &[S], path: &str) -> bool {
    prefixes
        .iter()
        .any(|prefix| matches_path_prefix(prefix.as_ref(), path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_prefix() {
        assert!(matches_path_prefix("/wp-admin/", "/wp-admin/"));
        assert!(matches_path_prefix("/wp-admin/", "/wp-admin/options.php"));
    }

    #[test]
    fn test_no_match() {
        assert!(!matches_path_prefix("/wp-admin/", "/wp-admin"));
        assert!(!matches_path_prefix("/blog/", "/news/blog/"));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!matches_path_prefix("/Blog/", "/blog/x"));
    }

    #[test]
    fn test_empty_prefix_never_matches() {
        assert!(!matches_path_prefix("", "/"));
    }

    #[test]
    fn test_any_prefix() {
        let prefixes = vec!["/blog/".to_string(), "/news/".to_string()];
        assert!(matches_any_prefix(&prefixes, "/news/today"));
        assert!(!matches_any_prefix(&prefixes, "/shop/"));

        let empty: Vec<String> = Vec::new();
        assert!(!matches_any_prefix(&empty, "/news/"));
    }
}
