//! Configuration model.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Video site configuration.
    pub site: SiteConfig,
    /// Search and ranking configuration.
    pub search: SearchConfig,
    /// Most-watched listing configuration.
    pub most_watched: MostWatchedConfig,
    /// TMDB configuration.
    pub tmdb: TmdbConfig,
    /// Trakt configuration.
    pub trakt: TraktConfig,
    /// Storage locations.
    pub paths: PathsConfig,
    /// History limits.
    pub history: HistoryConfig,
    /// Log level (debug, info, warn, error).
    pub log_level: Option<String>,
}

/// Video site configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site base URL.
    pub base_url: String,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Premium account e-mail.
    pub email: Option<String>,
    /// Premium account password.
    pub password: Option<String>,
    /// Request timeout in seconds.
    pub timeout: u64,
}

/// Search and ranking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum result pages fetched per search.
    pub search_pages: u32,
    /// Pagination stops once this many candidates were collected.
    pub result_limit: usize,
    /// Number of ranked results shown.
    pub display_limit: usize,
    /// Words appended to every site query.
    pub filter_suffix: String,
    pub filter_lang: String,
    pub filter_quality: String,
    /// Candidates whose title contains one of these are dropped.
    pub exclude_suffix: String,
    pub exclude_lang: String,
    pub exclude_quality: String,
    /// Preferred qualities.
    pub quality_1080p: bool,
    pub quality_720p: bool,
    pub quality_480p: bool,
    /// Ignore the preferred qualities above.
    pub ignore_quality: bool,
    /// Keep dubbed candidates only.
    pub prefer_dubbed: bool,
    /// Sort by size, largest first.
    pub sort_by_size: bool,
    /// Show size in listings.
    pub show_size: bool,
    /// Show duration in listings.
    pub show_duration: bool,
}

/// Most-watched listing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MostWatchedCategory {
    #[default]
    #[serde(rename = "12h")]
    Hours12,
    #[serde(rename = "7d")]
    Days7,
    #[serde(rename = "14d")]
    Days14,
}

impl MostWatchedCategory {
    /// Listing path on the video site.
    pub fn path(&self) -> &'static str {
        match self {
            MostWatchedCategory::Hours12 => "/nejsledovanejsi-online-videa",
            MostWatchedCategory::Days7 => "/nejsledovanejsi-online-videa-7-dni",
            MostWatchedCategory::Days14 => "/nejsledovanejsi-online-videa-14-dni",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MostWatchedCategory::Hours12 => "12h",
            MostWatchedCategory::Days7 => "7d",
            MostWatchedCategory::Days14 => "14d",
        }
    }
}

impl std::str::FromStr for MostWatchedCategory {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "12h" => Ok(MostWatchedCategory::Hours12),
            "7d" => Ok(MostWatchedCategory::Days7),
            "14d" => Ok(MostWatchedCategory::Days14),
            other => Err(crate::Error::InvalidConfig(format!(
                "unknown most-watched category '{}', expected 12h, 7d or 14d",
                other
            ))),
        }
    }
}

/// Most-watched listing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MostWatchedConfig {
    pub category: MostWatchedCategory,
    pub max_pages: u32,
    /// Cache lifetime in hours.
    pub cache_ttl_hours: i64,
    pub disable_cache: bool,
}

/// TMDB configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// API key or Bearer token.
    pub api_key: Option<String>,
    /// Language for responses.
    pub language: String,
    /// Browse listing cache lifetime in hours.
    pub cache_ttl_hours: i64,
}

/// Trakt configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraktConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub language: String,
    /// Scrobble playback to Trakt.
    pub scrobble: bool,
}

/// Storage locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root for cache, history and tokens.
    pub data_dir: PathBuf,
    /// `.strm` library directory (default: `<data_dir>/library`).
    pub library_dir: Option<PathBuf>,
    /// Download directory (default: `<data_dir>/downloads`).
    pub download_dir: Option<PathBuf>,
}

/// History limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Remembered search queries.
    pub search_limit: usize,
    /// Remembered played items.
    pub playback_limit: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://prehraj.to".to_string(),
            user_agent: "kodi/play.to".to_string(),
            email: None,
            password: None,
            timeout: 15,
        }
    }
}

impl SiteConfig {
    /// Premium credentials, when both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => Some((e.trim(), p)),
            _ => None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_pages: 2,
            result_limit: 56,
            display_limit: 50,
            filter_suffix: String::new(),
            filter_lang: String::new(),
            filter_quality: String::new(),
            exclude_suffix: String::new(),
            exclude_lang: String::new(),
            exclude_quality: String::new(),
            quality_1080p: false,
            quality_720p: false,
            quality_480p: false,
            ignore_quality: false,
            prefer_dubbed: false,
            sort_by_size: false,
            show_size: true,
            show_duration: true,
        }
    }
}

impl SearchConfig {
    /// Non-empty filter words, in suffix/lang/quality order.
    pub fn filter_words(&self) -> Vec<&str> {
        [&self.filter_suffix, &self.filter_lang, &self.filter_quality]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Default for MostWatchedConfig {
    fn default() -> Self {
        Self {
            category: MostWatchedCategory::default(),
            max_pages: 2,
            cache_ttl_hours: 1,
            disable_cache: false,
        }
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: "cs-CZ".to_string(),
            cache_ttl_hours: 24,
        }
    }
}

impl Default for TraktConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            language: "cs".to_string(),
            scrobble: false,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("playto"),
            library_dir: None,
            download_dir: None,
        }
    }
}

impl PathsConfig {
    /// JSON cache directory.
    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }

    /// Search history file.
    pub fn search_history_file(&self) -> PathBuf {
        self.data_dir.join("history").join("search_history.txt")
    }

    /// Playback history file.
    pub fn playback_file(&self) -> PathBuf {
        self.data_dir.join("playback").join("playback.json")
    }

    /// Scanned series, one JSON file each.
    pub fn series_dir(&self) -> PathBuf {
        self.data_dir.join("series")
    }

    /// Watched marks of scanned series.
    pub fn watched_dir(&self) -> PathBuf {
        self.data_dir.join("watched")
    }

    /// Stored Trakt tokens.
    pub fn trakt_tokens_file(&self) -> PathBuf {
        self.data_dir.join("trakt_tokens.json")
    }

    pub fn library_dir(&self) -> PathBuf {
        self.library_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("library"))
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("downloads"))
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            search_limit: 10,
            playback_limit: 50,
        }
    }
}

impl Config {
    /// Apply environment variable overrides.
    pub fn apply_env(mut self) -> Self {
        fn env(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty())
        }

        if let Some(key) = env("TMDB_API_KEY") {
            self.tmdb.api_key = Some(key);
        }
        if let Some(email) = env("PLAYTO_EMAIL") {
            self.site.email = Some(email);
        }
        if let Some(password) = env("PLAYTO_PASSWORD") {
            self.site.password = Some(password);
        }
        if let Some(id) = env("TRAKT_CLIENT_ID") {
            self.trakt.client_id = Some(id);
        }
        if let Some(secret) = env("TRAKT_CLIENT_SECRET") {
            self.trakt.client_secret = Some(secret);
        }
        self
    }
}

/// Get the configuration directory path.
pub fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("playto")
}

/// Load configuration from a specific file.
pub fn load_config_from(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Load configuration from file, falling back to defaults.
pub fn load_config() -> Config {
    let config_path = dirs_config_path().join("config.toml");

    let config = if config_path.exists() {
        match load_config_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring {}: {}", config_path.display(), e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    config.apply_env()
}
