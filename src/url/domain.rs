use url::Url;

/// Extracts the comparison key for a URL's domain
///
/// This is the lowercase host with a single leading `www.` removed. Scheme,
/// port, path, query and fragment play no part in it.
///
/// # Arguments
///
/// * `url` - An absolute URL string
///
/// # Returns
///
/// * `Some(String)` - The domain key
/// * `None` - If the URL does not parse or has no host
///
/// # Examples
///
/// ```
/// use sumi_atlas::url::domain_key;
///
/// assert_eq!(domain_key("https://www.Example.com/a"), Some("example.com".to_string()));
/// assert_eq!(domain_key("http://blog.example.com:8080/"), Some("blog.example.com".to_string()));
/// assert_eq!(domain_key("/relative"), None);
/// ```
pub fn domain_key(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();

    match host.strip_prefix("www.") {
        Some(stripped) if !stripped.is_empty() => Some(stripped.to_string()),
        _ => Some(host),
    }
}

/// Returns true if `url` lives on the same domain as `root`
///
/// `http://`, `https://` and an optional `www.` prefix are treated as the same
/// domain. Hostnames are compared exactly, so `example.com.evil.com` and
/// `notexample.com` are not the same domain as `example.com`.
///
/// # Examples
///
/// ```
/// use sumi_atlas::url::same_domain;
///
/// assert!(same_domain("http://example.com/x", "https://www.example.com"));
/// assert!(!same_domain("https://example.com.evil.com/", "https://example.com"));
/// ```
pub fn same_domain(url: &str, root: &str) -> bool {
    match (domain_key(url), domain_key(root)) {
        (Some(candidate), Some(root)) => candidate == root,
        _ => false,
    }
}
