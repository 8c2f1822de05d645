//! Document link collection over the visited pages

use crate::crawler::fetcher::fetch_page;
use crate::crawler::parser::{extract_links, LinkRules};
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// A document URL eligible for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Discovery order, 0-based; the only key used to order the merge
    pub index: usize,

    /// Absolute document URL
    pub url: Url,
}

/// Ordered, de-duplicated candidate list
///
/// The first occurrence of a URL wins its index.
#[derive(Debug, Default)]
pub struct CandidateList {
    seen: HashSet<Url>,
    items: Vec<Candidate>,
}

impl CandidateList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a URL if unseen; returns true if it was added
    pub fn push(&mut self, url: Url) -> bool {
        if !self.seen.insert(url.clone()) {
            return false;
        }
        let index = self.items.len();
        self.items.push(Candidate { index, url });
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Candidate> {
        self.items
    }
}

/// Re-fetches each visited page and gathers its document links
///
/// Pages are processed in the given order so candidate indices follow
/// traversal order. A page that fails to load is logged and skipped.
pub async fn collect_candidates(
    client: &Client,
    pages: &[Url],
    rules: &LinkRules,
    timeout: Duration,
) -> Vec<Candidate> {
    let mut candidates = CandidateList::new();

    for page in pages {
        let body = match fetch_page(client, page, timeout).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to load {} while collecting documents: {}", page, e);
                continue;
            }
        };

        let links = extract_links(&body, page, rules);
        let before = candidates.len();
        for document in links.documents {
            candidates.push(document);
        }
        tracing::debug!("{} new documents on {}", candidates.len() - before, page);
    }

    candidates.into_vec()
}
