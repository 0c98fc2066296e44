//! Series manager: episode scans of the video site and per-series storage.
//!
//! A scan runs several search queries for a series name, keeps the hits that
//! look like episodes and files them under season and episode numbers. Each
//! series is one JSON file in the series directory; watched marks live in a
//! parallel file in the watched directory.

use crate::core::scraper;
use crate::models::candidate::{CandidateResult, Quality};
use crate::services::listing::ListingParser;
use crate::services::prehrajto::PrehrajtoClient;
use crate::utils::fs::{read_or_empty, write_file};
use crate::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Search pages fetched per scan query.
pub const SCAN_PAGES: u32 = 5;

/// Episode markers, most specific first. One capture group means season 1.
static EPISODE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)s(\d+)e(\d+)",
        r"(\d+)x(\d+)",
        r"(?i)episode\s*(\d+)",
        r"(?i)ep\s*(\d+)",
        r"(?i)e(\d+)",
        r"(\d+)\.\s*(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

static SEASON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"season\s*(\d+)").expect("static pattern"));
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)").expect("static pattern"));
static ULTRA_HD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(2160p|4k)\b").expect("static pattern"));
static UNSAFE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-. ]").expect("static pattern"));

const EPISODE_KEYWORDS: &[&str] = &["episode", "season", "series", "ep", "complete", "serie", "disk"];

/// Stored episode source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEpisode {
    /// Title as shown on the site.
    pub name: String,
    /// Video page link.
    pub ident: String,
    pub size: String,
    /// Unix time in seconds.
    pub added_timestamp: f64,
    pub quality: Quality,
}

/// One scanned series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesData {
    /// Upper-cased series name.
    pub name: String,
    /// Date of the last scan, `YYYY-MM-DD`.
    pub last_updated: String,
    #[serde(default)]
    pub seasons: BTreeMap<u32, BTreeMap<u32, SeriesEpisode>>,
}

impl SeriesData {
    pub fn episode_count(&self) -> usize {
        self.seasons.values().map(BTreeMap::len).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WatchedMark {
    watched_timestamp: f64,
    watched: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WatchedData {
    series_name: String,
    #[serde(default)]
    watched: BTreeMap<u32, BTreeMap<u32, WatchedMark>>,
}

/// A stored series as listed from the series directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesEntry {
    /// Display name, upper-cased.
    pub name: String,
    /// File stem, as produced by [`safe_name`].
    pub safe_name: String,
}

/// File stem for a series name: unsafe characters become `_`, then
/// lower-cased with spaces as `_`.
pub fn safe_name(name: &str) -> String {
    UNSAFE_CHARS_RE
        .replace_all(name, "_")
        .to_lowercase()
        .replace(' ', "_")
}

/// Whether a title looks like an episode of `series`.
///
/// The title must contain the series name and carry an episode marker or
/// keyword.
pub fn is_likely_episode(title: &str, series: &str) -> bool {
    let lower = title.to_lowercase();
    if !lower.contains(&series.to_lowercase()) {
        return false;
    }
    EPISODE_PATTERNS.iter().any(|re| re.is_match(title))
        || EPISODE_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Season and episode numbers of an episode title.
///
/// The series name is removed first so digits in it are not read as episode
/// numbers.
pub fn detect_episode(title: &str, series: &str) -> Option<(u32, u32)> {
    let cleaned = title
        .to_lowercase()
        .replace(&series.to_lowercase(), "")
        .trim()
        .to_string();

    for re in EPISODE_PATTERNS.iter() {
        let Some(caps) = re.captures(&cleaned) else {
            continue;
        };
        let numbers: Option<Vec<u32>> = caps
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str().parse().ok())
            .collect();
        match numbers.as_deref() {
            Some([season, episode]) => return Some((*season, *episode)),
            Some([episode]) => return Some((1, *episode)),
            _ => continue,
        }
    }

    if cleaned.contains("season") || cleaned.contains("serie") {
        if let Some(caps) = SEASON_RE.captures(&cleaned) {
            let season: u32 = caps[1].parse().ok()?;
            let rest = cleaned.replacen(&caps[0], "", 1);
            let episode: u32 = NUMBER_RE.captures(&rest)?[1].parse().ok()?;
            return Some((season, episode));
        }
    }
    None
}

/// Quality of an episode title. Only explicit resolution tags count.
pub fn episode_quality(title: &str) -> Quality {
    let lower = title.to_lowercase();
    if lower.contains("1080p") || lower.contains("full hd") {
        Quality::P1080
    } else if lower.contains("720p") {
        Quality::P720
    } else if lower.contains("480p") {
        Quality::P480
    } else {
        Quality::Unknown
    }
}

fn quality_rank(quality: Quality) -> u8 {
    match quality {
        Quality::P1080 => 0,
        Quality::P720 => 1,
        Quality::P480 => 2,
        Quality::Unknown => 3,
    }
}

/// Keep the episode-like candidates of a scan, deduplicated by link, best
/// quality first. Ultra HD sources are skipped.
pub fn select_episodes(
    candidates: impl IntoIterator<Item = CandidateResult>,
    series: &str,
) -> Vec<(Quality, CandidateResult)> {
    let mut seen = HashSet::new();
    let mut selected: Vec<(Quality, CandidateResult)> = candidates
        .into_iter()
        .filter(|c| is_likely_episode(&c.title, series))
        .filter(|c| !ULTRA_HD_RE.is_match(&c.title))
        .filter(|c| seen.insert(c.link.clone()))
        .map(|c| (episode_quality(&c.title), c))
        .collect();
    selected.sort_by_key(|(q, _)| quality_rank(*q));
    selected
}

/// File episodes under their season and episode numbers.
///
/// Input is expected best first; the first source for a slot is kept.
pub fn organize(series: &str, episodes: Vec<(Quality, CandidateResult)>) -> SeriesData {
    let mut data = SeriesData {
        name: series.to_uppercase(),
        last_updated: chrono::Local::now().format("%Y-%m-%d").to_string(),
        seasons: BTreeMap::new(),
    };
    let now = now_secs();

    for (quality, candidate) in episodes {
        let Some((season, episode)) = detect_episode(&candidate.title, series) else {
            tracing::debug!("No episode number in '{}'", candidate.title);
            continue;
        };
        data.seasons
            .entry(season)
            .or_default()
            .entry(episode)
            .or_insert_with(|| SeriesEpisode {
                name: candidate.title,
                ident: candidate.link,
                size: candidate.size_str,
                added_timestamp: now,
                quality,
            });
    }
    data
}

/// Search queries run by a scan.
pub fn scan_queries(series: &str) -> Vec<String> {
    vec![
        series.to_string(),
        format!("{} season", series),
        format!("{} s01", series),
        format!("{} episode", series),
    ]
}

/// Scan the video site for episodes of `series` and store the result.
///
/// A failed query ends that query only; what the others found is kept.
pub async fn scan_series(
    client: &PrehrajtoClient,
    parser: &dyn ListingParser,
    store: &SeriesStore,
    series: &str,
) -> Result<SeriesData> {
    let mut candidates = Vec::new();
    for query in scan_queries(series) {
        let outcome = scraper::scrape_search(client, parser, &query, SCAN_PAGES, usize::MAX).await;
        if outcome.interrupted {
            tracing::warn!("Series query '{}' was cut short", query);
        }
        candidates.extend(outcome.candidates);
    }

    let total = candidates.len();
    let data = organize(series, select_episodes(candidates, series));
    tracing::info!(
        "Series '{}': {} episode(s) in {} season(s) from {} candidates",
        series,
        data.episode_count(),
        data.seasons.len(),
        total
    );

    store.save(series, &data)?;
    Ok(data)
}

/// Series and watched-mark files.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    series_dir: PathBuf,
    watched_dir: PathBuf,
}

impl SeriesStore {
    pub fn new(series_dir: impl Into<PathBuf>, watched_dir: impl Into<PathBuf>) -> Self {
        Self {
            series_dir: series_dir.into(),
            watched_dir: watched_dir.into(),
        }
    }

    pub fn series_path(&self, series: &str) -> PathBuf {
        self.series_dir.join(format!("{}.json", safe_name(series)))
    }

    pub fn watched_path(&self, series: &str) -> PathBuf {
        self.watched_dir
            .join(format!("{}_watched.json", safe_name(series)))
    }

    pub fn save(&self, series: &str, data: &SeriesData) -> Result<()> {
        write_file(&self.series_path(series), serde_json::to_string_pretty(data)?)
    }

    /// Stored series data. A corrupt file reads as missing.
    pub fn load(&self, series: &str) -> Result<Option<SeriesData>> {
        load_json(&self.series_path(series))
    }

    /// Stored series, sorted by name.
    pub fn list(&self) -> Result<Vec<SeriesEntry>> {
        let dir = match std::fs::read_dir(&self.series_dir) {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for entry in dir {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                entries.push(SeriesEntry {
                    name: stem.replace('_', " ").to_uppercase(),
                    safe_name: stem.to_string(),
                });
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Remove one episode. An emptied season is dropped and an emptied series
    /// deleted. Returns whether the episode existed.
    pub fn delete_episode(&self, series: &str, season: u32, episode: u32) -> Result<bool> {
        let Some(mut data) = self.load(series)? else {
            return Ok(false);
        };
        let Some(episodes) = data.seasons.get_mut(&season) else {
            return Ok(false);
        };
        if episodes.remove(&episode).is_none() {
            return Ok(false);
        }
        if episodes.is_empty() {
            data.seasons.remove(&season);
        }
        self.store_or_delete(series, &data)?;
        Ok(true)
    }

    /// Remove one season. Returns whether it existed.
    pub fn delete_season(&self, series: &str, season: u32) -> Result<bool> {
        let Some(mut data) = self.load(series)? else {
            return Ok(false);
        };
        if data.seasons.remove(&season).is_none() {
            return Ok(false);
        }
        self.store_or_delete(series, &data)?;
        Ok(true)
    }

    /// Remove a series and its watched marks. Returns whether it existed.
    pub fn delete_series(&self, series: &str) -> Result<bool> {
        let existed = remove_if_exists(&self.series_path(series))?;
        remove_if_exists(&self.watched_path(series))?;
        if existed {
            tracing::info!("Deleted series '{}'", series);
        }
        Ok(existed)
    }

    fn store_or_delete(&self, series: &str, data: &SeriesData) -> Result<()> {
        if data.seasons.is_empty() {
            self.delete_series(series)?;
            Ok(())
        } else {
            self.save(series, data)
        }
    }

    fn load_watched(&self, series: &str) -> Result<WatchedData> {
        Ok(load_json(&self.watched_path(series))?.unwrap_or_else(|| WatchedData {
            series_name: series.to_string(),
            watched: BTreeMap::new(),
        }))
    }

    fn save_watched(&self, series: &str, data: &WatchedData) -> Result<()> {
        write_file(&self.watched_path(series), serde_json::to_string_pretty(data)?)
    }

    pub fn mark_watched(&self, series: &str, season: u32, episode: u32) -> Result<()> {
        let mut data = self.load_watched(series)?;
        data.watched.entry(season).or_default().insert(
            episode,
            WatchedMark {
                watched_timestamp: now_secs(),
                watched: true,
            },
        );
        self.save_watched(series, &data)
    }

    pub fn mark_unwatched(&self, series: &str, season: u32, episode: u32) -> Result<()> {
        let mut data = self.load_watched(series)?;
        let Some(episodes) = data.watched.get_mut(&season) else {
            return Ok(());
        };
        episodes.remove(&episode);
        if episodes.is_empty() {
            data.watched.remove(&season);
        }
        self.save_watched(series, &data)
    }

    pub fn is_watched(&self, series: &str, season: u32, episode: u32) -> Result<bool> {
        let data = self.load_watched(series)?;
        Ok(data
            .watched
            .get(&season)
            .and_then(|s| s.get(&episode))
            .is_some_and(|m| m.watched))
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = read_or_empty(path)?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str(&content) {
        Ok(data) => Ok(Some(data)),
        Err(e) => {
            tracing::warn!("Ignoring corrupt {}: {}", path.display(), e);
            Ok(None)
        }
    }
}

fn remove_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
