//! TMDB browse listings with a JSON cache in front.

use crate::core::cache::JsonCache;
use crate::models::meta::MediaMeta;
use crate::services::tmdb::{BrowseList, BrowseMedia, BrowsePage, Genre, TmdbClient, TvDetails};
use crate::Result;
use chrono::Datelike;

/// Years offered by the year listing.
const YEAR_SPAN: i32 = 30;

/// Years from `current` back, newest first.
pub fn recent_years(current: i32) -> Vec<i32> {
    (current - YEAR_SPAN + 1..=current).rev().collect()
}

/// Years offered for the current date.
pub fn browse_years() -> Vec<i32> {
    recent_years(chrono::Local::now().year())
}

/// Browse listings, genres and show seasons.
pub struct BrowseService {
    tmdb: TmdbClient,
    cache: JsonCache,
    ttl_hours: i64,
}

impl BrowseService {
    /// A TTL of zero or less is 24 hours.
    pub fn new(tmdb: TmdbClient, cache: JsonCache, ttl_hours: i64) -> Self {
        let ttl_hours = if ttl_hours <= 0 { 24 } else { ttl_hours };
        Self {
            tmdb,
            cache,
            ttl_hours,
        }
    }

    /// One listing page. `refresh` skips the cache read.
    pub async fn list(
        &self,
        list: BrowseList,
        media: BrowseMedia,
        page: u32,
        refresh: bool,
    ) -> Result<BrowsePage> {
        let page = page.max(1);
        let name = format!("tmdb_{}", list.cache_name(media, page));
        if !refresh {
            if let Some(cached) = self.cache.load::<BrowsePage>(&name, self.ttl_hours) {
                return Ok(cached);
            }
        }

        let listing = self.tmdb.browse(list, media, page).await?;
        if !listing.results.is_empty() {
            self.cache.save(&name, &listing);
        }
        Ok(listing)
    }

    pub async fn genres(&self, media: BrowseMedia) -> Result<Vec<Genre>> {
        let name = format!("tmdb_genres_{}", media.as_str());
        if let Some(cached) = self.cache.load::<Vec<Genre>>(&name, self.ttl_hours) {
            return Ok(cached);
        }

        let genres = self.tmdb.genres(media).await?;
        if !genres.is_empty() {
            self.cache.save(&name, &genres);
        }
        Ok(genres)
    }

    /// Show details with its season list.
    pub async fn show(&self, tv_id: u64) -> Result<TvDetails> {
        let name = format!("tmdb_tv_detail_{}", tv_id);
        if let Some(cached) = self.cache.load::<TvDetails>(&name, self.ttl_hours) {
            return Ok(cached);
        }

        let details = self.tmdb.tv_details(tv_id).await?;
        self.cache.save(&name, &details);
        Ok(details)
    }

    /// Episode metadata of one season, each ready for a source search.
    pub async fn season(&self, tv_id: u64, season: u32) -> Result<Vec<MediaMeta>> {
        let name = format!("tmdb_tv_season_{}_{}", tv_id, season);
        if let Some(cached) = self.cache.load::<Vec<MediaMeta>>(&name, self.ttl_hours) {
            return Ok(cached);
        }

        let show = self.show(tv_id).await?.to_meta();
        let episodes = self.tmdb.season_episodes(&show, season).await?;
        if !episodes.is_empty() {
            self.cache.save(&name, &episodes);
        }
        Ok(episodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_years() {
        let years = recent_years(2026);
        assert_eq!(years.len(), 30);
        assert_eq!(years.first(), Some(&2026));
        assert_eq!(years.last(), Some(&1997));
    }
}
