//! URL handling module for Paper-Trawl
//!
//! This module provides URL normalization, domain extraction, origin checks,
//! and date-template expansion for seed URLs.

mod domain;
mod normalize;
mod template;

use url::Url;

// Re-export main functions
pub use domain::{extract_domain, site_slug};
pub use normalize::normalize_url;
pub use template::{DateLayout, DateTemplate};

/// Returns true if both URLs share scheme, host and port
///
/// # Examples
///
/// ```
/// use url::Url;
/// use paper_trawl::url::same_origin;
///
/// let a = Url::parse("https://example.com/a/node_1.html").unwrap();
/// let b = Url::parse("https://example.com/b/node_2.html").unwrap();
/// let c = Url::parse("https://other.com/node_3.html").unwrap();
/// assert!(same_origin(&a, &b));
/// assert!(!same_origin(&a, &c));
/// ```
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}
