//! Paginated listing scrape.
//!
//! Pages are fetched one at a time: whether page `n` is needed depends on
//! what page `n - 1` returned.

use crate::models::candidate::CandidateResult;
use crate::models::config::MostWatchedCategory;
use crate::services::listing::ListingParser;
use crate::services::prehrajto::PrehrajtoClient;
use std::collections::HashSet;

/// Candidates collected by a scrape.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOutcome {
    pub candidates: Vec<CandidateResult>,
    /// Pages requested, including a failed one.
    pub pages_fetched: u32,
    /// A network error or timeout cut the scrape short.
    pub interrupted: bool,
}

/// Scrape search results for `query`.
///
/// Stops after a page without a next-page link, once `result_limit`
/// candidates were collected, after `max_pages`, or on the first failed page.
pub async fn scrape_search(
    client: &PrehrajtoClient,
    parser: &dyn ListingParser,
    query: &str,
    max_pages: u32,
    result_limit: usize,
) -> ScrapeOutcome {
    let mut outcome = ScrapeOutcome::default();

    for page in 1..=max_pages {
        let url = client.search_url(query, page);
        outcome.pages_fetched = page;

        let html = match client.fetch_page(&url).await {
            Ok(html) => html,
            Err(e) => {
                outcome.interrupted = e.is_network();
                tracing::warn!("Search page {} failed, stopping: {}", page, e);
                break;
            }
        };

        let listing = parser.parse(&html, client.base_url());
        tracing::debug!(
            "Search page {}: {} candidates, next page: {}",
            page,
            listing.candidates.len(),
            listing.has_next
        );
        outcome.candidates.extend(listing.candidates);

        if !listing.has_next || outcome.candidates.len() >= result_limit {
            break;
        }
    }

    tracing::info!(
        "Scraped {} candidates for '{}' from {} page(s)",
        outcome.candidates.len(),
        query,
        outcome.pages_fetched
    );
    outcome
}

/// Listing URL of a most-watched page (1-based).
pub fn most_watched_url(base_url: &str, category: MostWatchedCategory, page: u32) -> String {
    let base = format!("{}{}", base_url.trim_end_matches('/'), category.path());
    if page <= 1 {
        base
    } else {
        format!("{}?vp-page={}", base, page)
    }
}

/// Scrape the most-watched listing, deduplicated by link.
///
/// Stops at the first page without candidates or after `max_pages`.
pub async fn scrape_most_watched(
    client: &PrehrajtoClient,
    parser: &dyn ListingParser,
    category: MostWatchedCategory,
    max_pages: u32,
    mut on_page: impl FnMut(u32),
) -> ScrapeOutcome {
    let mut outcome = ScrapeOutcome::default();
    let mut seen = HashSet::new();

    for page in 1..=max_pages {
        let url = most_watched_url(client.base_url(), category, page);
        outcome.pages_fetched = page;
        on_page(page);

        let html = match client.fetch_page(&url).await {
            Ok(html) => html,
            Err(e) => {
                outcome.interrupted = true;
                tracing::warn!("Most-watched page {} failed, stopping: {}", page, e);
                break;
            }
        };

        let listing = parser.parse(&html, client.base_url());
        if listing.candidates.is_empty() {
            tracing::debug!("Most-watched page {} is empty, stopping", page);
            break;
        }

        for candidate in listing.candidates {
            if seen.insert(candidate.link.clone()) {
                outcome.candidates.push(candidate);
            }
        }
    }

    tracing::info!(
        "Most watched ({}): {} unique items from {} page(s)",
        category.as_str(),
        outcome.candidates.len(),
        outcome.pages_fetched
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_watched_url() {
        assert_eq!(
            most_watched_url("https://prehraj.to", MostWatchedCategory::Hours12, 1),
            "https://prehraj.to/nejsledovanejsi-online-videa"
        );
        assert_eq!(
            most_watched_url("https://prehraj.to/", MostWatchedCategory::Days7, 3),
            "https://prehraj.to/nejsledovanejsi-online-videa-7-dni?vp-page=3"
        );
    }
}
