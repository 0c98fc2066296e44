//! Daily TV tips from CSFD with TMDB artwork.
//!
//! Tip details are fetched by a pool of at most [`MAX_CONCURRENT_DETAILS`]
//! tasks. Results arrive in completion order; a failed tip is left out.

use crate::core::cache::JsonCache;
use crate::models::tip::{FilmDetail, Tip, TipRef};
use crate::services::csfd::CsfdClient;
use crate::services::tmdb::{image_url, TmdbClient};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Concurrent detail fetches.
pub const MAX_CONCURRENT_DETAILS: usize = 3;

/// Lifetime of every tips cache entry.
const TIPS_TTL_HOURS: i64 = 24;

const DAILY_TIPS_CACHE: &str = "csfd_daily_tips";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Artwork {
    poster: Option<String>,
    fanart: Option<String>,
}

/// Daily tips service.
#[derive(Debug, Clone)]
pub struct TipsService {
    csfd: CsfdClient,
    tmdb: Option<TmdbClient>,
    cache: JsonCache,
}

impl TipsService {
    pub fn new(csfd: CsfdClient, tmdb: Option<TmdbClient>, cache: JsonCache) -> Self {
        Self { csfd, tmdb, cache }
    }

    /// Today's tips, from cache when fresh.
    pub async fn daily_tips(&self, refresh: bool) -> Result<Vec<Tip>> {
        if !refresh {
            if let Some(tips) = self.cache.load::<Vec<Tip>>(DAILY_TIPS_CACHE, TIPS_TTL_HOURS) {
                tracing::debug!("Using {} cached tips", tips.len());
                return Ok(tips);
            }
        }

        let refs = self.csfd.fetch_tip_refs().await?;
        tracing::info!("Enriching {} tips", refs.len());
        let tips = self.enrich(refs).await;

        if !tips.is_empty() {
            self.cache.save(DAILY_TIPS_CACHE, &tips);
        }
        Ok(tips)
    }

    /// Fetch details for every reference through the bounded pool.
    pub async fn enrich(&self, refs: Vec<TipRef>) -> Vec<Tip> {
        let permits = Arc::new(Semaphore::new(MAX_CONCURRENT_DETAILS));
        let mut tasks = JoinSet::new();

        for tip in refs {
            let service = self.clone();
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok()?;
                match service.detail(&tip.id).await {
                    Ok(detail) if detail.title.is_some() => Some(Tip {
                        id: tip.id,
                        time: tip.time,
                        channel: tip.channel,
                        detail,
                    }),
                    Ok(_) => {
                        tracing::warn!("Tip {} has no title, skipping", tip.id);
                        None
                    }
                    Err(e) => {
                        tracing::error!("Failed to get details for tip {}: {}", tip.id, e);
                        None
                    }
                }
            });
        }

        let mut tips = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(tip)) => tips.push(tip),
                Ok(None) => {}
                Err(e) => tracing::error!("Tip task failed: {}", e),
            }
        }
        tracing::debug!("Returning {} tips", tips.len());
        tips
    }

    /// Film detail with artwork, cached per film.
    pub async fn detail(&self, id: &str) -> Result<FilmDetail> {
        let cache_name = format!("csfd_detail_{}", id);
        if let Some(detail) = self.cache.load::<FilmDetail>(&cache_name, TIPS_TTL_HOURS) {
            return Ok(detail);
        }

        let mut detail = self.csfd.fetch_detail(id).await?;
        let art = self.artwork(&detail).await;
        detail.poster = art.poster;
        detail.fanart = art.fanart;

        if detail.title.is_some() {
            self.cache.save(&cache_name, &detail);
        }
        Ok(detail)
    }

    /// Search query for a tip.
    pub async fn select(&self, id: &str) -> Result<String> {
        let detail = self.detail(id).await?;
        detail
            .search_query()
            .ok_or_else(|| Error::CsfdRequest(format!("film {} has no title", id)))
    }

    /// Try title+year, title, original+year, original until a poster is found.
    async fn artwork(&self, detail: &FilmDetail) -> Artwork {
        let Some(tmdb) = &self.tmdb else {
            return Artwork::default();
        };

        let title = detail.title.as_deref().filter(|t| !t.is_empty());
        let original = detail
            .original_title
            .as_deref()
            .filter(|o| !o.is_empty() && Some(*o) != title);
        let year = detail.year.as_deref().filter(|y| !y.is_empty());

        let mut attempts: Vec<(&str, Option<&str>)> = Vec::new();
        if let Some(title) = title {
            if year.is_some() {
                attempts.push((title, year));
            }
            attempts.push((title, None));
        }
        if let Some(original) = original {
            if year.is_some() {
                attempts.push((original, year));
            }
            attempts.push((original, None));
        }

        for (query, year) in attempts {
            let art = self.tmdb_images(tmdb, query, year).await;
            if art.poster.is_some() {
                return art;
            }
        }
        tracing::debug!("No TMDB artwork for {:?}", title);
        Artwork::default()
    }

    async fn tmdb_images(&self, tmdb: &TmdbClient, title: &str, year: Option<&str>) -> Artwork {
        let cache_name = format!("tmdb_{}_{}_movie", title.to_lowercase(), year.unwrap_or(""));
        if let Some(art) = self.cache.load::<Artwork>(&cache_name, TIPS_TTL_HOURS) {
            return art;
        }

        let results = match tmdb.search_movie(title, year).await {
            Ok(results) => results,
            Err(e) => {
                tracing::error!("TMDB search failed for {} ({:?}): {}", title, year, e);
                return Artwork::default();
            }
        };
        let Some(first) = results.into_iter().next() else {
            return Artwork::default();
        };

        let poster = Some(image_url(first.poster_path.as_deref(), "w780")).filter(|u| !u.is_empty());
        let fanart = Some(image_url(first.backdrop_path.as_deref(), "w1280"))
            .filter(|u| !u.is_empty())
            .or_else(|| poster.clone());
        let art = Artwork { poster, fanart };

        self.cache.save(&cache_name, &art);
        art
    }
}
