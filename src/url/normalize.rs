use crate::UrlError;
use url::Url;

/// Normalizes a URL so that equivalent page and document links compare equal
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything other than HTTP and HTTPS
/// 3. Require a host
/// 4. Remove fragment (everything after #)
/// 5. Remove an empty query string (trailing ?)
///
/// Host lowercasing and dot-segment removal are already performed by the
/// `url` parser. Query parameters are kept as-is since they may select content.
///
/// # Examples
///
/// ```
/// use paper_trawl::url::normalize_url;
///
/// let url = normalize_url("http://EXAMPLE.COM/a/../node_2.html#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/node_2.html");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Normalizes an already parsed URL
pub(crate) fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}
