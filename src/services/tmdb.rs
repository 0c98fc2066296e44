//! TMDB API client.

use crate::models::config::TmdbConfig;
use crate::models::meta::{MediaKind, MediaMeta};
use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Image CDN base.
pub const TMDB_IMAGE_URL: &str = "https://image.tmdb.org/t/p/";

/// Original languages kept in search listings.
const ALLOWED_LANGUAGES: &[&str] = &["en", "cs", "sk", "de", "fr", "pl", "es", "it"];

static CJK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x{3040}-\x{30ff}\x{4e00}-\x{9fff}\x{ac00}-\x{d7af}]").expect("static pattern")
});

/// TMDB API client.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    api_key: String,
    language: String,
    /// Bearer token (API v4 style) instead of `api_key` parameter
    use_bearer: bool,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchPage<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

/// Item of a `search/multi` or browse listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiSearchItem {
    pub id: u64,
    #[serde(default)]
    pub media_type: String,
    pub title: Option<String>,
    pub name: Option<String>,
    pub original_title: Option<String>,
    pub original_name: Option<String>,
    pub original_language: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: Option<f32>,
}

/// Movie search item.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieSearchItem {
    pub id: u64,
    pub title: String,
    pub original_title: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: Option<f32>,
}

/// Season details.
#[derive(Debug, Deserialize)]
pub struct SeasonDetails {
    pub season_number: u32,
    #[serde(default)]
    pub episodes: Vec<EpisodeInfo>,
}

/// Episode info within a season.
#[derive(Debug, Deserialize)]
pub struct EpisodeInfo {
    pub name: String,
    pub overview: Option<String>,
    pub episode_number: u32,
    pub air_date: Option<String>,
    pub still_path: Option<String>,
    pub vote_average: Option<f32>,
}

/// Media type of a browse listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BrowseMedia {
    Movie,
    Tv,
}

impl BrowseMedia {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowseMedia::Movie => "movie",
            BrowseMedia::Tv => "tv",
        }
    }
}

/// Browse listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseList {
    Trending,
    Discover,
    TopRated,
    /// Movies only.
    NowPlaying,
    /// Movies only.
    Upcoming,
    /// Shows only.
    AiringToday,
    /// Shows only.
    OnTheAir,
    /// Popular titles of one genre ID.
    Genre(u32),
    /// Popular titles released (or first aired) in one year.
    Year(u32),
}

impl BrowseList {
    pub fn name(&self) -> &'static str {
        match self {
            BrowseList::Trending => "trending",
            BrowseList::Discover => "discover",
            BrowseList::TopRated => "top_rated",
            BrowseList::NowPlaying => "now_playing",
            BrowseList::Upcoming => "upcoming",
            BrowseList::AiringToday => "airing_today",
            BrowseList::OnTheAir => "on_the_air",
            BrowseList::Genre(_) => "genre",
            BrowseList::Year(_) => "year",
        }
    }

    /// API path and extra query parameters, `None` when the listing does not
    /// exist for `media`.
    pub fn endpoint(&self, media: BrowseMedia) -> Option<(String, String)> {
        let m = media.as_str();
        let popular = "&sort_by=popularity.desc";
        let endpoint = match (self, media) {
            (BrowseList::Trending, _) => (format!("trending/{}/week", m), String::new()),
            (BrowseList::Discover, _) => (format!("discover/{}", m), popular.to_string()),
            (BrowseList::TopRated, _) => (format!("{}/top_rated", m), String::new()),
            (BrowseList::NowPlaying, BrowseMedia::Movie) => ("movie/now_playing".to_string(), String::new()),
            (BrowseList::Upcoming, BrowseMedia::Movie) => ("movie/upcoming".to_string(), String::new()),
            (BrowseList::AiringToday, BrowseMedia::Tv) => ("tv/airing_today".to_string(), String::new()),
            (BrowseList::OnTheAir, BrowseMedia::Tv) => ("tv/on_the_air".to_string(), String::new()),
            (BrowseList::Genre(id), _) => (
                format!("discover/{}", m),
                format!("&with_genres={}{}", id, popular),
            ),
            (BrowseList::Year(year), BrowseMedia::Movie) => (
                "discover/movie".to_string(),
                format!("&primary_release_year={}{}", year, popular),
            ),
            (BrowseList::Year(year), BrowseMedia::Tv) => (
                "discover/tv".to_string(),
                format!("&first_air_date_year={}{}", year, popular),
            ),
            _ => return None,
        };
        Some(endpoint)
    }

    /// Cache name of one listing page.
    pub fn cache_name(&self, media: BrowseMedia, page: u32) -> String {
        let m = media.as_str();
        match self {
            BrowseList::Genre(id) => format!("genre_{}_{}_page_{}", m, id, page),
            BrowseList::Year(year) => format!("year_{}_{}_page_{}", m, year, page),
            _ => format!("{}_{}_page_{}", self.name(), m, page),
        }
    }
}

/// One page of a browse listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowsePage {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<MultiSearchItem>,
}

fn first_page() -> u32 {
    1
}

/// TMDB genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<Genre>,
}

/// Season entry of a show's details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub season_number: u32,
    pub name: Option<String>,
    pub air_date: Option<String>,
    #[serde(default)]
    pub episode_count: u32,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
}

/// Show details from `tv/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvDetails {
    pub id: u64,
    pub name: String,
    pub original_name: Option<String>,
    pub first_air_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub seasons: Vec<SeasonSummary>,
}

impl TvDetails {
    /// Seasons without the specials season 0.
    pub fn regular_seasons(&self) -> impl Iterator<Item = &SeasonSummary> {
        self.seasons.iter().filter(|s| s.season_number > 0)
    }

    /// Show metadata.
    pub fn to_meta(&self) -> MediaMeta {
        MediaMeta {
            tmdb_id: Some(self.id),
            title: self.name.clone(),
            original_title: self.original_name.clone().filter(|t| *t != self.name),
            year: self
                .first_air_date
                .as_deref()
                .and_then(|d| d.get(..4))
                .map(|y| y.to_string()),
            plot: self.overview.clone().unwrap_or_default(),
            poster: image_url(self.poster_path.as_deref(), "w500"),
            fanart: image_url(self.backdrop_path.as_deref(), "original"),
            rating: self.vote_average,
            genres: self.genres.iter().map(|g| g.name.clone()).collect(),
            media_type: MediaKind::Tv,
            ..Default::default()
        }
    }
}

impl MultiSearchItem {
    /// Display title, falling back to the original title.
    pub fn display_title(&self) -> String {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .or(self.original_title.as_deref())
            .or(self.original_name.as_deref())
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    /// Release or first-air year.
    pub fn year(&self) -> Option<String> {
        self.release_date
            .as_deref()
            .filter(|d| !d.is_empty())
            .or(self.first_air_date.as_deref())
            .and_then(|d| d.get(..4))
            .map(|y| y.to_string())
    }

    /// Convert to playback metadata.
    pub fn into_meta(self) -> MediaMeta {
        let title = self.display_title();
        let year = self.year();
        let original_title = self
            .original_title
            .clone()
            .or(self.original_name.clone())
            .filter(|t| *t != title);
        let media_type = if self.media_type == "tv" {
            MediaKind::Tv
        } else {
            MediaKind::Movie
        };

        MediaMeta {
            tmdb_id: Some(self.id),
            title,
            original_title,
            year,
            plot: self.overview.unwrap_or_default(),
            poster: image_url(self.poster_path.as_deref(), "w500"),
            fanart: image_url(self.backdrop_path.as_deref(), "original"),
            rating: self.vote_average,
            media_type,
            ..Default::default()
        }
    }

    /// Listing label, e.g. `[MOVIE] Pelíšky (1999)`.
    pub fn label(&self) -> String {
        format!(
            "[{}] {} ({})",
            self.media_type.to_uppercase(),
            self.display_title(),
            self.year().unwrap_or_default()
        )
    }
}

/// Full image URL for a TMDB path, empty when there is no path.
pub fn image_url(path: Option<&str>, size: &str) -> String {
    match path {
        Some(p) if !p.is_empty() => format!("{}{}{}", TMDB_IMAGE_URL, size, p),
        _ => String::new(),
    }
}

/// Show metadata narrowed to one episode number.
fn episode_base(show: &MediaMeta, season: u32, episode: u32) -> MediaMeta {
    let mut meta = show.clone();
    meta.media_type = MediaKind::Episode;
    meta.tv_show_title = Some(show.title.clone());
    meta.season = Some(season);
    meta.episode = Some(episode);
    meta
}

/// Overlay listed episode details on episode metadata.
fn apply_episode(meta: &mut MediaMeta, ep: EpisodeInfo) {
    meta.title = ep.name;
    if let Some(plot) = ep.overview.filter(|p| !p.is_empty()) {
        meta.plot = plot;
    }
    if ep.vote_average.is_some() {
        meta.rating = ep.vote_average;
    }
    let still = image_url(ep.still_path.as_deref(), "original");
    if !still.is_empty() {
        meta.fanart = still;
    }
}

/// Whether a listing item passes the language filter.
fn is_allowed(item: &MultiSearchItem) -> bool {
    let lang = item.original_language.as_deref().unwrap_or_default();
    ALLOWED_LANGUAGES.contains(&lang) && !CJK_RE.is_match(&item.display_title())
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(api_key: impl Into<String>, language: impl Into<String>) -> Self {
        let api_key = api_key.into();
        // Bearer tokens start with "eyJ" (base64 encoded JWT header)
        let use_bearer = api_key.starts_with("eyJ");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();

        Self {
            api_key,
            language: language.into(),
            use_bearer,
            base_url: TMDB_BASE_URL.to_string(),
            client,
        }
    }

    /// Create a client from config. Fails when no key is configured.
    pub fn from_config(config: &TmdbConfig) -> Result<Self> {
        match config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(Self::new(key, config.language.clone())),
            _ => Err(Error::TmdbApiKeyMissing),
        }
    }

    /// Point the client at another API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build a request with proper authentication.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        if self.use_bearer {
            request.header("Authorization", format!("Bearer {}", self.api_key))
        } else {
            request
        }
    }

    /// Build URL with optional api_key parameter (only for v3 style).
    fn build_url(&self, path: &str, extra_params: &str) -> String {
        if self.use_bearer {
            format!(
                "{}/{}?language={}{}",
                self.base_url, path, self.language, extra_params
            )
        } else {
            format!(
                "{}/{}?api_key={}&language={}{}",
                self.base_url, path, self.api_key, self.language, extra_params
            )
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self.build_request(url).send().await?;
        if !resp.status().is_success() {
            return Err(Error::TmdbRequest(format!(
                "HTTP {}",
                resp.status().as_u16()
            )));
        }
        Ok(resp.json().await?)
    }

    /// Verify API key is valid.
    pub async fn verify_api_key(&self) -> Result<bool> {
        let url = if self.use_bearer {
            format!("{}/authentication", self.base_url)
        } else {
            format!("{}/authentication?api_key={}", self.base_url, self.api_key)
        };

        let resp = self.build_request(&url).send().await?;
        Ok(resp.status().is_success())
    }

    /// Search movies and shows, keeping only `movie`/`tv` items in allowed
    /// languages.
    pub async fn search_multi(&self, query: &str, year: Option<&str>) -> Result<Vec<MultiSearchItem>> {
        let year_param = year.map(|y| format!("&year={}", y)).unwrap_or_default();
        let url = self.build_url(
            "search/multi",
            &format!("&query={}&page=1{}", urlencoding::encode(query), year_param),
        );

        let page: SearchPage<MultiSearchItem> = self.get_json(&url).await?;
        let before = page.results.len();
        let results: Vec<MultiSearchItem> = page
            .results
            .into_iter()
            .filter(|r| r.media_type == "movie" || r.media_type == "tv")
            .filter(is_allowed)
            .collect();

        tracing::debug!(
            "TMDB search/multi '{}': {} of {} results kept",
            query,
            results.len(),
            before
        );
        Ok(results)
    }

    /// Search for movies.
    pub async fn search_movie(&self, query: &str, year: Option<&str>) -> Result<Vec<MovieSearchItem>> {
        let year_param = year.map(|y| format!("&year={}", y)).unwrap_or_default();
        let url = self.build_url(
            "search/movie",
            &format!("&query={}{}", urlencoding::encode(query), year_param),
        );

        let page: SearchPage<MovieSearchItem> = self.get_json(&url).await?;
        Ok(page.results)
    }

    /// Get season details.
    pub async fn get_season_details(&self, tv_id: u64, season_number: u32) -> Result<SeasonDetails> {
        let url = self.build_url(&format!("tv/{}/season/{}", tv_id, season_number), "");
        self.get_json(&url).await
    }

    /// Expand show metadata to one of its episodes.
    ///
    /// Falls back to the show's own art and plot when the episode is not
    /// listed.
    pub async fn episode_meta(&self, show: &MediaMeta, season: u32, episode: u32) -> Result<MediaMeta> {
        let mut meta = episode_base(show, season, episode);
        let Some(tv_id) = show.tmdb_id else {
            return Ok(meta);
        };

        let details = self.get_season_details(tv_id, season).await?;
        if let Some(ep) = details
            .episodes
            .into_iter()
            .find(|e| e.episode_number == episode)
        {
            apply_episode(&mut meta, ep);
        }
        Ok(meta)
    }

    /// One page of a browse listing, language filtered.
    ///
    /// Items without a media type take the listing's.
    pub async fn browse(&self, list: BrowseList, media: BrowseMedia, page: u32) -> Result<BrowsePage> {
        let (path, params) = list.endpoint(media).ok_or_else(|| Error::TmdbListUnsupported {
            list: list.name().to_string(),
            media: media.as_str().to_string(),
        })?;
        let url = self.build_url(&path, &format!("{}&page={}", params, page.max(1)));

        let mut listing: BrowsePage = self.get_json(&url).await?;
        let before = listing.results.len();
        listing.results = std::mem::take(&mut listing.results)
            .into_iter()
            .map(|mut item| {
                if item.media_type.is_empty() {
                    item.media_type = media.as_str().to_string();
                }
                item
            })
            .filter(|r| r.media_type == "movie" || r.media_type == "tv")
            .filter(is_allowed)
            .collect();

        tracing::debug!(
            "TMDB {} page {}: {} of {} results kept",
            path,
            listing.page,
            listing.results.len(),
            before
        );
        Ok(listing)
    }

    /// Genre list of a media type.
    pub async fn genres(&self, media: BrowseMedia) -> Result<Vec<Genre>> {
        let url = self.build_url(&format!("genre/{}/list", media.as_str()), "");
        let list: GenreList = self.get_json(&url).await?;
        Ok(list.genres)
    }

    /// Show details with its season list.
    pub async fn tv_details(&self, tv_id: u64) -> Result<TvDetails> {
        let url = self.build_url(&format!("tv/{}", tv_id), "");
        self.get_json(&url).await
    }

    /// Episode metadata of every listed episode in a season.
    pub async fn season_episodes(&self, show: &MediaMeta, season: u32) -> Result<Vec<MediaMeta>> {
        let Some(tv_id) = show.tmdb_id else {
            return Ok(Vec::new());
        };

        let details = self.get_season_details(tv_id, season).await?;
        Ok(details
            .episodes
            .into_iter()
            .map(|ep| {
                let mut meta = episode_base(show, season, ep.episode_number);
                apply_episode(&mut meta, ep);
                meta
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(media_type: &str, lang: &str, title: &str) -> MultiSearchItem {
        MultiSearchItem {
            id: 1,
            media_type: media_type.to_string(),
            title: Some(title.to_string()),
            name: None,
            original_title: Some(title.to_string()),
            original_name: None,
            original_language: Some(lang.to_string()),
            release_date: Some("1999-04-01".to_string()),
            first_air_date: None,
            overview: None,
            poster_path: Some("/p.jpg".to_string()),
            backdrop_path: None,
            vote_average: Some(7.9),
        }
    }

    #[test]
    fn test_bearer_detection() {
        let client = TmdbClient::new("eyJhbGciOi", "cs-CZ");
        assert!(client.use_bearer);
        assert!(client.build_url("search/multi", "").starts_with(
            "https://api.themoviedb.org/3/search/multi?language=cs-CZ"
        ));

        let client = TmdbClient::new("abc123", "cs-CZ");
        assert!(!client.use_bearer);
        assert!(client.build_url("x", "").contains("api_key=abc123"));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = TmdbConfig::default();
        assert!(matches!(
            TmdbClient::from_config(&config),
            Err(Error::TmdbApiKeyMissing)
        ));
    }

    #[test]
    fn test_language_filter() {
        assert!(is_allowed(&item("movie", "cs", "Pelíšky")));
        assert!(!is_allowed(&item("movie", "ja", "Akira")));
        assert!(!is_allowed(&item("movie", "en", "千と千尋")));
    }

    #[test]
    fn test_into_meta() {
        let meta = item("movie", "cs", "Pelíšky").into_meta();
        assert_eq!(meta.tmdb_id, Some(1));
        assert_eq!(meta.year.as_deref(), Some("1999"));
        assert_eq!(meta.poster, "https://image.tmdb.org/t/p/w500/p.jpg");
        assert_eq!(meta.fanart, "");
        assert_eq!(meta.original_title, None);
        assert_eq!(meta.media_type, MediaKind::Movie);
    }

    #[test]
    fn test_missing_results_is_empty() {
        let page: SearchPage<MultiSearchItem> = serde_json::from_str("{}").unwrap();
        assert!(page.results.is_empty());

        let listing: BrowsePage = serde_json::from_str(r#"{"total_pages": 3}"#).unwrap();
        assert_eq!(listing.page, 1);
        assert!(listing.results.is_empty());
    }

    #[test]
    fn test_browse_endpoints() {
        assert_eq!(
            BrowseList::Trending.endpoint(BrowseMedia::Tv),
            Some(("trending/tv/week".to_string(), String::new()))
        );
        assert_eq!(
            BrowseList::Year(2020).endpoint(BrowseMedia::Tv),
            Some((
                "discover/tv".to_string(),
                "&first_air_date_year=2020&sort_by=popularity.desc".to_string()
            ))
        );
        assert_eq!(BrowseList::NowPlaying.endpoint(BrowseMedia::Tv), None);
        assert_eq!(BrowseList::AiringToday.endpoint(BrowseMedia::Movie), None);
    }

    #[test]
    fn test_browse_cache_names() {
        assert_eq!(
            BrowseList::TopRated.cache_name(BrowseMedia::Movie, 2),
            "top_rated_movie_page_2"
        );
        assert_eq!(
            BrowseList::Genre(18).cache_name(BrowseMedia::Tv, 1),
            "genre_tv_18_page_1"
        );
    }

    #[test]
    fn test_apply_episode_keeps_show_plot_when_empty() {
        let show = MediaMeta {
            tmdb_id: Some(70523),
            title: "Dark".to_string(),
            plot: "Show plot".to_string(),
            ..Default::default()
        };
        let mut meta = episode_base(&show, 1, 2);
        apply_episode(
            &mut meta,
            EpisodeInfo {
                name: "Lies".to_string(),
                overview: Some(String::new()),
                episode_number: 2,
                air_date: None,
                still_path: Some("/s.jpg".to_string()),
                vote_average: None,
            },
        );
        assert_eq!(meta.title, "Lies");
        assert_eq!(meta.plot, "Show plot");
        assert_eq!(meta.fanart, "https://image.tmdb.org/t/p/original/s.jpg");
        assert_eq!(meta.source_query(), "Dark S01E02");
    }

    #[test]
    fn test_label() {
        let mut tv = item("tv", "de", "");
        tv.title = None;
        tv.name = Some("Dark".to_string());
        tv.release_date = None;
        tv.first_air_date = Some("2017-12-01".to_string());
        assert_eq!(tv.label(), "[TV] Dark (2017)");
    }
}
