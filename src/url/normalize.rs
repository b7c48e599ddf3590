use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves `href` against `base` and strips the query string and fragment
///
/// # Normalization Steps
///
/// 1. Parse `base`; give up if it is malformed
/// 2. Resolve `href` against it using standard URL resolution
/// 3. Reject anything that is not HTTP or HTTPS after resolution
///    (`mailto:`, `javascript:`, `data:` and friends)
/// 4. Remove the query string
/// 5. Remove the fragment
///
/// # Arguments
///
/// * `href` - The possibly-relative reference, as written in the markup
/// * `base` - The absolute URL to resolve against
///
/// # Returns
///
/// * `Some(String)` - The absolute, normalized URL
/// * `None` - The reference is malformed or unusable; callers skip it
///
/// # Examples
///
/// ```
/// use sumi_atlas::url::normalize;
///
/// let url = normalize("https://example.com/a?x=1#y", "https://example.com");
/// assert_eq!(url.as_deref(), Some("https://example.com/a"));
///
/// let url = normalize("../up", "https://example.com/a/b/c");
/// assert_eq!(url.as_deref(), Some("https://example.com/a/up"));
/// ```
pub fn normalize(href: &str, base: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    let mut url = base.join(href.trim()).ok()?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    url.set_query(None);
    url.set_fragment(None);

    Some(url.into())
}

/// Parses and validates a crawl root
///
/// The root must be an absolute HTTP(S) URL with a host. The returned string
/// is normalized the same way every discovered link is, so the root and a
/// link back to it produce the same key.
///
/// # Examples
///
/// ```
/// use sumi_atlas::url::parse_root;
///
/// assert_eq!(parse_root("https://example.com").unwrap(), "https://example.com/");
/// assert!(parse_root("example.com").is_err());
/// ```
pub fn parse_root(root: &str) -> UrlResult<String> {
    let url = Url::parse(root.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", root, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    normalize(url.as_str(), url.as_str()).ok_or_else(|| UrlError::Parse(root.to_string()))
}
