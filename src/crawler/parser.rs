//! HTML link extractor
//!
//! This module parses one fetched page and splits its anchors into:
//! - Content pages to follow (same origin, matching the page predicate)
//! - Document references to download (matching the document predicate)
//!
//! Parsing never fails: unparsable fragments simply contribute no links.

use crate::config::LinkConfig;
use crate::url::{normalize_url, same_origin};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Predicates deciding what a link points at
#[derive(Debug, Clone)]
pub struct LinkRules {
    page_token: String,
    page_extension: String,
    document_extension: String,
}

impl LinkRules {
    /// Builds rules from the `[links]` configuration section
    pub fn from_config(config: &LinkConfig) -> Self {
        Self {
            page_token: config.page_token.clone(),
            page_extension: config.page_extension.clone(),
            document_extension: config.document_extension.to_lowercase(),
        }
    }

    /// Path contains the page token and the page extension
    pub fn is_content_page(&self, url: &Url) -> bool {
        let path = url.path();
        path.contains(&self.page_token) && path.contains(&self.page_extension)
    }

    /// Path contains the document extension, ignoring case
    pub fn is_document(&self, url: &Url) -> bool {
        url.path().to_lowercase().contains(&self.document_extension)
    }

    /// The document extension, lowercase and including the dot
    pub fn document_extension(&self) -> &str {
        &self.document_extension
    }
}

impl Default for LinkRules {
    fn default() -> Self {
        Self::from_config(&LinkConfig::default())
    }
}

/// Links extracted from one page, in document order and de-duplicated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedLinks {
    /// Same-origin content pages to traverse
    pub pages: Vec<Url>,

    /// Document references on any origin
    pub documents: Vec<Url>,
}

/// Parses HTML content and extracts page and document links
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` resolved against the page URL (or `<base href>` when present)
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
/// - Non-HTTP(S) URLs after resolution
///
/// A link may be both a page and a document only if it matches both predicates;
/// in practice the extensions keep them apart.
///
/// # Example
///
/// ```
/// use paper_trawl::crawler::{extract_links, LinkRules};
/// use url::Url;
///
/// let html = r#"<a href="node_2.html">Next</a><a href="/files/A1.PDF">A1</a>"#;
/// let base = Url::parse("https://example.com/2024/node_1.html").unwrap();
/// let links = extract_links(html, &base, &LinkRules::default());
/// assert_eq!(links.pages[0].as_str(), "https://example.com/2024/node_2.html");
/// assert_eq!(links.documents[0].as_str(), "https://example.com/files/A1.PDF");
/// ```
pub fn extract_links(html: &str, base_url: &Url, rules: &LinkRules) -> ExtractedLinks {
    let document = Html::parse_document(html);
    let base = effective_base(&document, base_url);

    let mut links = ExtractedLinks::default();
    let mut seen_pages = HashSet::new();
    let mut seen_documents = HashSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_link(href, &base) else {
            tracing::trace!("Skipping unusable href {:?} on {}", href, base_url);
            continue;
        };

        if rules.is_document(&url) {
            if seen_documents.insert(url.clone()) {
                links.documents.push(url);
            }
        } else if rules.is_content_page(&url) && same_origin(&url, base_url) {
            if seen_pages.insert(url.clone()) {
                links.pages.push(url);
            }
        }
    }

    links
}

/// Returns the `<base href>` target if present and valid, else the page URL
fn effective_base(document: &Html, page_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("href"))
                .and_then(|href| page_url.join(href.trim()).ok())
        })
        .unwrap_or_else(|| page_url.clone())
}

/// Resolves a link href to a normalized absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid or non-HTTP(S) URLs
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    normalize_url(absolute.as_str()).ok()
}
