//! Search pipeline.
//!
//! raw query -> normalizer -> TMDB lookup (metadata only)
//!           -> filter words + padded markers -> scraper -> classifier

use crate::core::classifier::{self, RankingPolicy};
use crate::core::history::SearchHistory;
use crate::core::normalizer::{pad_episode_markers, QueryNormalizer};
use crate::core::scraper;
use crate::models::candidate::CandidateResult;
use crate::models::config::Config;
use crate::models::meta::{MediaKind, MediaMeta};
use crate::models::token::SearchToken;
use crate::services::listing::{ListingParser, PrehrajtoListing};
use crate::services::prehrajto::PrehrajtoClient;
use crate::services::tmdb::TmdbClient;
use crate::utils::text::strip_diacritics;
use crate::Result;
use serde::Serialize;

/// Per-call search options.
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Index of the TMDB match to use when several were found.
    pub pick: Option<usize>,
    /// Look up metadata on TMDB.
    pub lookup_metadata: bool,
    /// Store the site query in search history.
    pub record_history: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            pick: None,
            lookup_metadata: true,
            record_history: true,
        }
    }
}

/// Result of one search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub token: SearchToken,
    /// Query sent to the video site.
    pub site_query: String,
    /// Selected TMDB metadata, `None` for direct play.
    pub metadata: Option<MediaMeta>,
    /// Labels of the TMDB matches when several were found and none was picked.
    pub choices: Vec<String>,
    /// Ranked candidates, not truncated.
    pub candidates: Vec<CandidateResult>,
    /// Scraping stopped on a network error.
    pub interrupted: bool,
}

/// Search service wiring the pipeline stages together.
pub struct SearchService {
    config: Config,
    site: PrehrajtoClient,
    tmdb: Option<TmdbClient>,
    parser: Box<dyn ListingParser>,
    normalizer: QueryNormalizer,
    history: SearchHistory,
}

impl SearchService {
    /// Create a service from config. TMDB is optional.
    pub fn new(config: Config) -> Result<Self> {
        let site = PrehrajtoClient::new(&config.site)?;
        let tmdb = match TmdbClient::from_config(&config.tmdb) {
            Ok(client) => Some(client),
            Err(_) => {
                tracing::debug!("No TMDB key configured, metadata lookup disabled");
                None
            }
        };
        let history = SearchHistory::new(
            config.paths.search_history_file(),
            config.history.search_limit,
        );

        Ok(Self {
            config,
            site,
            tmdb,
            parser: Box::new(PrehrajtoListing),
            normalizer: QueryNormalizer::default(),
            history,
        })
    }

    /// Replace the TMDB client.
    pub fn with_tmdb(mut self, tmdb: Option<TmdbClient>) -> Self {
        self.tmdb = tmdb;
        self
    }

    /// Replace the listing parser.
    pub fn with_parser(mut self, parser: Box<dyn ListingParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn site(&self) -> &PrehrajtoClient {
        &self.site
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    /// Diacritic-free query with the configured filter words appended.
    pub fn build_query(&self, raw: &str) -> String {
        let mut parts = vec![strip_diacritics(raw.trim())];
        parts.extend(
            self.config
                .search
                .filter_words()
                .into_iter()
                .map(|s| s.to_string()),
        );
        parts.join(" ").trim().to_string()
    }

    /// Run the full pipeline for a free-text query.
    pub async fn search(&self, raw: &str, options: SearchOptions) -> Result<SearchOutcome> {
        let query = self.build_query(raw);
        let token = self.normalizer.normalize(&query);
        tracing::info!(
            "Searching '{}' (title '{}', year {:?})",
            query,
            token.cleaned_title,
            token.year
        );

        let (metadata, choices) = if options.lookup_metadata {
            self.lookup_metadata(&token, options.pick).await
        } else {
            (None, Vec::new())
        };
        match &metadata {
            Some(meta) => tracing::info!("Metadata found for '{}'", meta.title),
            None => tracing::info!("No metadata, direct play"),
        }

        let site_query = pad_episode_markers(&query);
        if options.record_history {
            if let Err(e) = self.history.record(&site_query) {
                tracing::warn!("Failed to record search history: {}", e);
            }
        }

        let (candidates, interrupted) = self.scrape_and_rank(&site_query).await;

        Ok(SearchOutcome {
            token,
            site_query,
            metadata,
            choices,
            candidates,
            interrupted,
        })
    }

    /// Find sources for known metadata.
    pub async fn find_sources(&self, meta: &MediaMeta) -> (String, Vec<CandidateResult>) {
        let site_query = meta.source_query();
        let (candidates, _) = self.scrape_and_rank(&site_query).await;
        (site_query, candidates)
    }

    async fn lookup_metadata(
        &self,
        token: &SearchToken,
        pick: Option<usize>,
    ) -> (Option<MediaMeta>, Vec<String>) {
        let Some(tmdb) = &self.tmdb else {
            return (None, Vec::new());
        };
        if token.cleaned_title.is_empty() {
            return (None, Vec::new());
        }

        let results = match tmdb
            .search_multi(&token.cleaned_title, token.year.as_deref())
            .await
        {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("TMDB search failed: {}", e);
                return (None, Vec::new());
            }
        };

        let selected = match (results.len(), pick) {
            (0, _) => return (None, Vec::new()),
            (1, _) => results.into_iter().next(),
            (_, Some(index)) => results.into_iter().nth(index),
            (_, None) => {
                let choices = results.iter().map(|r| r.label()).collect();
                return (None, choices);
            }
        };
        let Some(item) = selected else {
            tracing::warn!("Picked TMDB match is out of range");
            return (None, Vec::new());
        };

        let meta = item.into_meta();
        let meta = match (meta.media_type, token.season, token.episode) {
            (MediaKind::Tv, Some(season), Some(episode)) => {
                match tmdb.episode_meta(&meta, season, episode).await {
                    Ok(episode_meta) => episode_meta,
                    Err(e) => {
                        tracing::warn!("Episode lookup failed: {}", e);
                        meta
                    }
                }
            }
            _ => meta,
        };
        (Some(meta), Vec::new())
    }

    async fn scrape_and_rank(&self, site_query: &str) -> (Vec<CandidateResult>, bool) {
        self.site.ensure_premium(&self.config.site).await;

        let policy = RankingPolicy::from_config(&self.config.search);
        let outcome = scraper::scrape_search(
            &self.site,
            self.parser.as_ref(),
            site_query,
            policy.search_pages,
            policy.result_limit,
        )
        .await;

        let ranked = classifier::rank(outcome.candidates, &policy);
        tracing::info!("{} candidates after ranking", ranked.len());
        (ranked, outcome.interrupted)
    }
}
