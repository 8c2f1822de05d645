//! Breadth-first page traversal from a seed URL

use crate::crawler::fetcher::fetch_page;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{extract_links, LinkRules};
use crate::state::PageState;
use crate::url::normalize_url;
use crate::TrawlError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Walks every content page reachable from `seed`
///
/// Pages are fetched one at a time in FIFO order. A fetched page has its
/// content-page links enqueued; a failed page is marked visited and not
/// expanded. The returned list holds successfully fetched pages in the order
/// they were first visited, and is the ordering basis for everything after.
///
/// # Returns
///
/// * `Ok(pages)` - Traversal finished; may be empty if the seed matched nothing
/// * `Err(TrawlError::SeedUnreachable)` - The seed itself could not be fetched
pub async fn walk_pages(
    client: &Client,
    seed: &Url,
    rules: &LinkRules,
    timeout: Duration,
) -> Result<Vec<Url>, TrawlError> {
    let seed = normalize_url(seed.as_str())?;
    let mut frontier = Frontier::new(seed.clone());
    let mut visited_order = Vec::new();

    while let Some(current) = frontier.next_pending() {
        tracing::info!("Crawling page: {}", current);

        match fetch_page(client, &current, timeout).await {
            Ok(body) => {
                frontier.mark(&current, PageState::Fetched);
                visited_order.push(current.clone());

                let links = extract_links(&body, &current, rules);
                let mut added = 0;
                for page in links.pages {
                    if frontier.enqueue(page) {
                        added += 1;
                    }
                }
                tracing::debug!(
                    "{} new pages queued from {} ({} pending)",
                    added,
                    current,
                    frontier.pending_len()
                );
            }
            Err(e) => {
                frontier.mark(&current, PageState::Failed);

                if current == seed && visited_order.is_empty() {
                    tracing::warn!("Seed page {} is unreachable: {}", seed, e);
                    return Err(TrawlError::SeedUnreachable {
                        url: seed.to_string(),
                        reason: e.to_string(),
                    });
                }

                tracing::warn!("Failed to crawl {}: {}", current, e);
            }
        }
    }

    tracing::info!(
        "Traversal finished: {} pages visited out of {} discovered",
        visited_order.len(),
        frontier.known_len()
    );

    Ok(visited_order)
}
