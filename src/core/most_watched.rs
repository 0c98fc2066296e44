//! Most-watched listing with a JSON cache in front.

use crate::core::cache::JsonCache;
use crate::core::scraper::{self, ScrapeOutcome};
use crate::models::candidate::CandidateResult;
use crate::models::config::{MostWatchedCategory, MostWatchedConfig};
use crate::services::listing::{ListingParser, PrehrajtoListing};
use crate::services::prehrajto::PrehrajtoClient;
use crate::Result;

const CACHE_PREFIX: &str = "most_watched_";

/// Where a listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSource {
    Cache,
    Site,
}

/// Most-watched items of one category.
#[derive(Debug, Clone)]
pub struct MostWatched {
    pub category: MostWatchedCategory,
    pub items: Vec<CandidateResult>,
    pub source: ListingSource,
    /// The scrape stopped on an error; such runs are not cached.
    pub interrupted: bool,
}

/// Cache name of a category and page count.
pub fn cache_name(category: MostWatchedCategory, pages: u32) -> String {
    format!("{}{}_{}", CACHE_PREFIX, category.as_str(), pages)
}

/// Most-watched listing service.
pub struct MostWatchedService<'a> {
    client: &'a PrehrajtoClient,
    cache: JsonCache,
    config: MostWatchedConfig,
    parser: Box<dyn ListingParser>,
}

impl<'a> MostWatchedService<'a> {
    pub fn new(client: &'a PrehrajtoClient, cache: JsonCache, config: MostWatchedConfig) -> Self {
        Self {
            client,
            cache,
            config,
            parser: Box::new(PrehrajtoListing),
        }
    }

    /// Replace the listing parser.
    pub fn with_parser(mut self, parser: Box<dyn ListingParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Load the listing, from cache when fresh.
    ///
    /// `refresh` skips the cache read. `on_page` is called before each page
    /// fetch.
    pub async fn load(&self, refresh: bool, on_page: impl FnMut(u32)) -> MostWatched {
        let category = self.config.category;
        let pages = self.config.max_pages.max(1);
        let name = cache_name(category, pages);
        let use_cache = !self.config.disable_cache;

        if use_cache && !refresh {
            if let Some(items) = self
                .cache
                .load::<Vec<CandidateResult>>(&name, self.config.cache_ttl_hours)
            {
                tracing::info!("Most watched ({}): {} items from cache", category.as_str(), items.len());
                return MostWatched {
                    category,
                    items,
                    source: ListingSource::Cache,
                    interrupted: false,
                };
            }
        }

        let ScrapeOutcome {
            candidates,
            interrupted,
            ..
        } = scraper::scrape_most_watched(self.client, self.parser.as_ref(), category, pages, on_page)
            .await;

        if use_cache && !interrupted && !candidates.is_empty() {
            self.cache.save(&name, &candidates);
        }

        MostWatched {
            category,
            items: candidates,
            source: ListingSource::Site,
            interrupted,
        }
    }

    /// Remove every cached most-watched listing.
    pub fn clear(&self) -> Result<usize> {
        self.cache.remove_prefix(CACHE_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_name() {
        assert_eq!(cache_name(MostWatchedCategory::Hours12, 2), "most_watched_12h_2");
        assert_eq!(cache_name(MostWatchedCategory::Days14, 5), "most_watched_14d_5");
    }
}
