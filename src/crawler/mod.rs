//! Crawler module for page discovery
//!
//! This module contains the discovery half of the pipeline, including:
//! - HTTP fetching of HTML pages
//! - Link extraction (content pages and document references)
//! - The breadth-first frontier and traversal
//! - Ordered document candidate collection

mod collector;
mod fetcher;
mod frontier;
mod parser;
mod walker;

pub use collector::{collect_candidates, Candidate, CandidateList};
pub use fetcher::{build_http_client, fetch_page, FetchError};
pub(crate) use fetcher::send_get;
pub use frontier::Frontier;
pub use parser::{extract_links, ExtractedLinks, LinkRules};
pub use walker::walk_pages;
