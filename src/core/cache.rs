//! Timestamped JSON file cache.
//!
//! Each entry is `<dir>/<name>.json` holding `{ "timestamp", "data" }`.
//! Entries that are expired, empty or unreadable are deleted on load.

use crate::utils::fs::{ensure_dir, write_file};
use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Longest cache name used as a file stem verbatim.
const MAX_PLAIN_NAME: usize = 100;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// Unix time in seconds.
    timestamp: f64,
    data: T,
}

/// JSON file cache rooted at one directory.
#[derive(Debug, Clone)]
pub struct JsonCache {
    dir: PathBuf,
}

impl JsonCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a cache name.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key(name)))
    }

    /// Load an entry younger than `ttl_hours`. A TTL of zero or less is one hour.
    pub fn load<T: DeserializeOwned>(&self, name: &str, ttl_hours: i64) -> Option<T> {
        let ttl_hours = if ttl_hours <= 0 {
            tracing::warn!("Invalid cache TTL {} for '{}', using 1 hour", ttl_hours, name);
            1
        } else {
            ttl_hours
        };

        let path = self.path(name);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Cache '{}' does not exist", name);
                return None;
            }
            Err(e) => {
                tracing::error!("Cache '{}' is unreadable, removing: {}", name, e);
                remove_quietly(&path);
                return None;
            }
        };

        if content.trim().is_empty() {
            tracing::warn!("Cache '{}' is empty, removing", name);
            remove_quietly(&path);
            return None;
        }

        let entry: CacheEntry<T> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::error!("Cache '{}' is corrupt, removing: {}", name, e);
                remove_quietly(&path);
                return None;
            }
        };

        let age = now_secs() - entry.timestamp;
        if age < (ttl_hours * 3600) as f64 {
            tracing::debug!("Using cached '{}' (TTL {}h)", name, ttl_hours);
            Some(entry.data)
        } else {
            tracing::info!(
                "Cache '{}' expired ({:.1}h > {}h)",
                name,
                age / 3600.0,
                ttl_hours
            );
            remove_quietly(&path);
            None
        }
    }

    /// Store an entry. Failures are logged.
    pub fn save<T: Serialize>(&self, name: &str, data: &T) {
        if let Err(e) = self.try_save(name, data) {
            tracing::error!("Failed to save cache '{}': {}", name, e);
        }
    }

    fn try_save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let entry = CacheEntry {
            timestamp: now_secs(),
            data,
        };
        write_file(&self.path(name), serde_json::to_string_pretty(&entry)?)?;
        tracing::debug!("Saved cache '{}'", name);
        Ok(())
    }

    /// Remove one entry.
    pub fn remove(&self, name: &str) {
        remove_quietly(&self.path(name));
    }

    /// Remove every entry whose name starts with `prefix`. Returns the count.
    pub fn remove_prefix(&self, prefix: &str) -> Result<usize> {
        if !self.dir.is_dir() {
            return Ok(0);
        }
        let prefix = sanitize(prefix);
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let matches = path.extension().is_some_and(|e| e == "json")
                && path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| s.starts_with(&prefix));
            if matches {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        tracing::debug!("Removed {} cache entries with prefix '{}'", removed, prefix);
        Ok(removed)
    }

    /// Remove every entry.
    pub fn clear(&self) -> Result<usize> {
        ensure_dir(&self.dir)?;
        self.remove_prefix("")
    }
}

fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::debug!("Could not remove {}: {}", path.display(), e);
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File stem for a cache name.
///
/// Safe short names are used as is. Anything else keeps a readable prefix and
/// gains a hash of the full name, so distinct names never share a file.
pub fn cache_key(name: &str) -> String {
    let safe = sanitize(name);
    if safe == name && safe.len() <= MAX_PLAIN_NAME {
        return safe;
    }
    let digest = Sha256::digest(name.as_bytes());
    let hash: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();
    let prefix: String = safe.chars().take(40).collect();
    format!("{}_{}", prefix, hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let cache = JsonCache::new(temp.path());

        cache.save("most_watched_12h_2", &vec!["a".to_string(), "b".to_string()]);
        let data: Option<Vec<String>> = cache.load("most_watched_12h_2", 1);
        assert_eq!(data, Some(vec!["a".to_string(), "b".to_string()]));

        let raw = std::fs::read_to_string(cache.path("most_watched_12h_2")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value["timestamp"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_missing_entry() {
        let temp = TempDir::new().unwrap();
        let cache = JsonCache::new(temp.path());
        assert_eq!(cache.load::<String>("nothing", 1), None);
    }

    #[test]
    fn test_expired_entry_is_removed() {
        let temp = TempDir::new().unwrap();
        let cache = JsonCache::new(temp.path());
        let old = serde_json::json!({ "timestamp": now_secs() - 7200.0, "data": 1 });
        std::fs::write(cache.path("old"), old.to_string()).unwrap();

        assert_eq!(cache.load::<i32>("old", 1), None);
        assert!(!cache.path("old").exists());
    }

    #[test]
    fn test_invalid_ttl_means_one_hour() {
        let temp = TempDir::new().unwrap();
        let cache = JsonCache::new(temp.path());
        let fresh = serde_json::json!({ "timestamp": now_secs() - 60.0, "data": 5 });
        std::fs::write(cache.path("fresh"), fresh.to_string()).unwrap();

        assert_eq!(cache.load::<i32>("fresh", 0), Some(5));
        assert_eq!(cache.load::<i32>("fresh", -3), Some(5));
    }

    #[test]
    fn test_empty_and_corrupt_entries_are_removed() {
        let temp = TempDir::new().unwrap();
        let cache = JsonCache::new(temp.path());
        std::fs::write(cache.path("empty"), "").unwrap();
        std::fs::write(cache.path("corrupt"), "{not json").unwrap();

        assert_eq!(cache.load::<i32>("empty", 1), None);
        assert_eq!(cache.load::<i32>("corrupt", 1), None);
        assert!(!cache.path("empty").exists());
        assert!(!cache.path("corrupt").exists());
    }

    #[test]
    fn test_unreadable_entry_is_removed() {
        let temp = TempDir::new().unwrap();
        let cache = JsonCache::new(temp.path());
        std::fs::write(cache.path("binary"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

        assert_eq!(cache.load::<i32>("binary", 1), None);
        assert!(!cache.path("binary").exists());
    }

    #[test]
    fn test_remove_prefix() {
        let temp = TempDir::new().unwrap();
        let cache = JsonCache::new(temp.path());
        cache.save("most_watched_12h_2", &1);
        cache.save("most_watched_7d_1", &2);
        cache.save("csfd_daily_tips", &3);

        assert_eq!(cache.remove_prefix("most_watched_").unwrap(), 2);
        assert_eq!(cache.load::<i32>("csfd_daily_tips", 24), Some(3));
        assert_eq!(cache.clear().unwrap(), 1);
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("most_watched_12h_2"), "most_watched_12h_2");

        let a = cache_key("tmdb_pelíšky_1999_movie");
        let b = cache_key("tmdb_pelisky_1999_movie");
        assert_ne!(a, b);
        assert!(a.starts_with("tmdb_pel__ky_1999_movie_"));
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'));

        let long = "x".repeat(300);
        assert!(cache_key(&long).len() < 100);
    }
}
