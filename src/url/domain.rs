use url::Url;

/// Extracts the domain from a URL
///
/// Returns the lowercase host portion, or `None` if the URL has no host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use paper_trawl::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Turns a site name or host into a filename-friendly slug
///
/// Spaces and dots become underscores.
///
/// # Examples
///
/// ```
/// use paper_trawl::url::site_slug;
///
/// assert_eq!(site_slug("paper.example.com"), "paper_example_com");
/// assert_eq!(site_slug("Daily News 2.0"), "Daily_News_2_0");
/// ```
pub fn site_slug(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c == ' ' || c == '.' { '_' } else { c })
        .collect()
}
