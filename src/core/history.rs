//! Search and playback history.

use crate::models::meta::{MediaKind, MediaMeta};
use crate::utils::fs::{read_or_empty, write_file};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Recent search queries, one per line, newest first.
#[derive(Debug, Clone)]
pub struct SearchHistory {
    path: PathBuf,
    limit: usize,
}

impl SearchHistory {
    pub fn new(path: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            path: path.into(),
            limit: limit.max(1),
        }
    }

    /// Stored queries, newest first.
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(read_or_empty(&self.path)?
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(|l| l.to_string())
            .collect())
    }

    /// Record a query. A query already present stays where it is.
    pub fn record(&self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }
        let mut lines = self.list()?;
        if lines.iter().any(|l| l == query) {
            return Ok(());
        }
        lines.insert(0, query.to_string());
        lines.truncate(self.limit);
        self.write(&lines)
    }

    /// Remove one query. Returns whether it was present.
    pub fn remove(&self, query: &str) -> Result<bool> {
        let mut lines = self.list()?;
        let before = lines.len();
        lines.retain(|l| l != query.trim());
        if lines.len() == before {
            return Ok(false);
        }
        self.write(&lines)?;
        Ok(true)
    }

    /// Remove all queries.
    pub fn clear(&self) -> Result<()> {
        self.write(&[])
    }

    fn write(&self, lines: &[String]) -> Result<()> {
        write_file(&self.path, lines.join("\n"))
    }
}

/// One played item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackEntry {
    pub meta: MediaMeta,
    /// Video page link.
    pub link: String,
    /// When it was played (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub played_at: Option<String>,
}

impl PlaybackEntry {
    /// Identity of the played item: kind plus TMDB ID (title when there is
    /// no ID), plus season and episode for episodes.
    pub fn key(&self) -> String {
        let meta = &self.meta;
        let id = meta
            .tmdb_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| meta.title.clone());
        let mut key = format!("{}{}", meta.media_type, id);
        if meta.media_type == MediaKind::Episode {
            key.push_str(&format!(
                "{}:{}",
                meta.season.map(|s| s.to_string()).unwrap_or_default(),
                meta.episode.map(|e| e.to_string()).unwrap_or_default()
            ));
        }
        key
    }

    /// Show title of an episode.
    pub fn show_title(&self) -> Option<&str> {
        if self.meta.media_type != MediaKind::Episode {
            return None;
        }
        Some(self.meta.tv_show_title.as_deref().unwrap_or("Unknown show"))
    }

    /// Listing label: `S01E02 - Title` for episodes, the title otherwise.
    pub fn label(&self) -> String {
        match (self.meta.media_type, self.meta.season, self.meta.episode) {
            (MediaKind::Episode, Some(s), Some(e)) => format!("S{:02}E{:02} - {}", s, e, self.meta.title),
            _ => match self.meta.year.as_deref() {
                Some(year) if !year.is_empty() => format!("{} ({})", self.meta.title, year),
                _ => self.meta.title.clone(),
            },
        }
    }
}

/// Playback history grouped for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackListing {
    /// Shows in first-seen order with their episodes, newest first.
    pub shows: Vec<(String, Vec<PlaybackEntry>)>,
    pub movies: Vec<PlaybackEntry>,
}

/// What to remove from playback history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackTarget {
    /// All episodes of a show.
    Show(String),
    Episode { show: String, season: u32, episode: u32 },
    /// Movie by title.
    Movie(String),
}

/// Played items, newest first, stored as a JSON array.
#[derive(Debug, Clone)]
pub struct PlaybackHistory {
    path: PathBuf,
    limit: usize,
}

impl PlaybackHistory {
    pub fn new(path: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            path: path.into(),
            limit: limit.max(1),
        }
    }

    /// All entries, newest first.
    pub fn entries(&self) -> Result<Vec<PlaybackEntry>> {
        let content = read_or_empty(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, entries: &[PlaybackEntry]) -> Result<()> {
        write_file(&self.path, serde_json::to_string_pretty(entries)?)
    }

    /// Record a played item, replacing an older entry for the same item.
    pub fn record(&self, meta: MediaMeta, link: &str) -> Result<()> {
        let entry = PlaybackEntry {
            meta,
            link: link.to_string(),
            played_at: Some(chrono::Local::now().to_rfc3339()),
        };
        let key = entry.key();

        let mut entries = self.entries()?;
        entries.retain(|e| e.key() != key);
        entries.insert(0, entry);
        entries.truncate(self.limit);

        tracing::debug!("Recorded playback '{}' ({} entries)", key, entries.len());
        self.save(&entries)
    }

    /// Group episodes by show and list movies.
    pub fn listing(&self) -> Result<PlaybackListing> {
        let mut listing = PlaybackListing::default();
        for entry in self.entries()? {
            match entry.show_title().map(|s| s.to_string()) {
                Some(show) => match listing.shows.iter_mut().find(|(title, _)| *title == show) {
                    Some((_, episodes)) => episodes.push(entry),
                    None => listing.shows.push((show, vec![entry])),
                },
                None => listing.movies.push(entry),
            }
        }
        Ok(listing)
    }

    /// Episodes played of one show, newest first.
    pub fn show_episodes(&self, show: &str) -> Result<Vec<PlaybackEntry>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| e.show_title() == Some(show))
            .collect())
    }

    /// Remove matching entries. Returns how many were removed.
    pub fn remove(&self, target: &PlaybackTarget) -> Result<usize> {
        let mut entries = self.entries()?;
        let before = entries.len();

        entries.retain(|e| {
            let meta = &e.meta;
            let removed = match target {
                PlaybackTarget::Show(show) => e.show_title() == Some(show.as_str()),
                PlaybackTarget::Episode {
                    show,
                    season,
                    episode,
                } => {
                    e.show_title() == Some(show.as_str())
                        && meta.season == Some(*season)
                        && meta.episode == Some(*episode)
                }
                PlaybackTarget::Movie(title) => {
                    meta.media_type != MediaKind::Episode && meta.title == *title
                }
            };
            !removed
        });

        let removed = before - entries.len();
        if removed > 0 {
            self.save(&entries)?;
        }
        Ok(removed)
    }

    /// Remove all entries.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn movie(id: u64, title: &str) -> MediaMeta {
        MediaMeta {
            tmdb_id: Some(id),
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn episode(show: &str, season: u32, ep: u32) -> MediaMeta {
        MediaMeta {
            tmdb_id: Some(1),
            title: format!("Episode {}", ep),
            media_type: MediaKind::Episode,
            tv_show_title: Some(show.to_string()),
            season: Some(season),
            episode: Some(ep),
            ..Default::default()
        }
    }

    #[test]
    fn test_search_history_order_and_limit() {
        let temp = TempDir::new().unwrap();
        let history = SearchHistory::new(temp.path().join("h").join("search.txt"), 3);

        assert!(history.list().unwrap().is_empty());
        for q in ["a", "b", "c", "b", "d"] {
            history.record(q).unwrap();
        }
        assert_eq!(history.list().unwrap(), vec!["d", "c", "b"]);

        assert!(history.remove("c").unwrap());
        assert!(!history.remove("zzz").unwrap());
        assert_eq!(history.list().unwrap(), vec!["d", "b"]);

        history.clear().unwrap();
        assert!(history.list().unwrap().is_empty());
    }

    #[test]
    fn test_playback_dedup_and_limit() {
        let temp = TempDir::new().unwrap();
        let history = PlaybackHistory::new(temp.path().join("playback.json"), 3);

        history.record(movie(1, "A"), "https://x/a").unwrap();
        history.record(movie(2, "B"), "https://x/b").unwrap();
        history.record(movie(1, "A"), "https://x/a2").unwrap();

        let entries = history.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].link, "https://x/a2");
        assert_eq!(entries[1].meta.title, "B");

        history.record(movie(3, "C"), "l").unwrap();
        history.record(movie(4, "D"), "l").unwrap();
        let titles: Vec<_> = history.entries().unwrap().into_iter().map(|e| e.meta.title).collect();
        assert_eq!(titles, vec!["D", "C", "A"]);
    }

    #[test]
    fn test_episodes_keyed_by_number() {
        let temp = TempDir::new().unwrap();
        let history = PlaybackHistory::new(temp.path().join("playback.json"), 10);

        history.record(episode("Dark", 1, 1), "l1").unwrap();
        history.record(episode("Dark", 1, 2), "l2").unwrap();
        history.record(episode("Dark", 1, 1), "l1b").unwrap();
        history.record(movie(9, "Film"), "l3").unwrap();

        let listing = history.listing().unwrap();
        assert_eq!(listing.shows.len(), 1);
        assert_eq!(listing.shows[0].0, "Dark");
        assert_eq!(listing.shows[0].1.len(), 2);
        assert_eq!(listing.shows[0].1[0].label(), "S01E01 - Episode 1");
        assert_eq!(listing.movies.len(), 1);

        assert_eq!(history.show_episodes("Dark").unwrap().len(), 2);
    }

    #[test]
    fn test_remove_targets() {
        let temp = TempDir::new().unwrap();
        let history = PlaybackHistory::new(temp.path().join("playback.json"), 10);
        history.record(episode("Dark", 1, 1), "l").unwrap();
        history.record(episode("Dark", 1, 2), "l").unwrap();
        history.record(episode("Lost", 2, 1), "l").unwrap();
        history.record(movie(9, "Film"), "l").unwrap();

        let target = PlaybackTarget::Episode {
            show: "Dark".to_string(),
            season: 1,
            episode: 2,
        };
        assert_eq!(history.remove(&target).unwrap(), 1);
        assert_eq!(history.remove(&PlaybackTarget::Show("Dark".to_string())).unwrap(), 1);
        assert_eq!(history.remove(&PlaybackTarget::Movie("Film".to_string())).unwrap(), 1);
        assert_eq!(history.entries().unwrap().len(), 1);

        history.clear().unwrap();
        assert!(history.entries().unwrap().is_empty());
    }

    #[test]
    fn test_untracked_movies_keyed_by_title() {
        let a = PlaybackEntry {
            meta: MediaMeta::bare("A"),
            link: String::new(),
            played_at: None,
        };
        let b = PlaybackEntry {
            meta: MediaMeta::bare("B"),
            ..a.clone()
        };
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), "movieA");
    }
}
