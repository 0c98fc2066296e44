//! Metadata attached to a playable item.

use serde::{Deserialize, Serialize};

/// Media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Movie,
    Tv,
    Episode,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Tv => write!(f, "tv"),
            MediaKind::Episode => write!(f, "episode"),
        }
    }
}

/// Metadata carried from lookup to playback and history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMeta {
    /// TMDB ID (the show's ID for episodes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u64>,
    /// Display title (episode title for episodes).
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default)]
    pub plot: String,
    #[serde(default)]
    pub poster: String,
    #[serde(default)]
    pub fanart: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub media_type: MediaKind,
    /// Show title, episodes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tv_show_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl MediaMeta {
    /// Minimal metadata for a title with no lookup result.
    pub fn bare(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Query used to find sources for this item on the video site.
    ///
    /// Movies search `"<title> <year>"`, episodes `"<show> SxxEyy"`. An
    /// episode missing its numbers falls back to `"<show> <title>"`.
    pub fn source_query(&self) -> String {
        if self.media_type == MediaKind::Episode {
            let show = self.tv_show_title.as_deref().unwrap_or(&self.title);
            return match (self.season, self.episode) {
                (Some(s), Some(e)) => format!("{} S{:02}E{:02}", show, s, e),
                _ => format!("{} {}", show, self.title),
            };
        }
        format!("{} {}", self.title, self.year.as_deref().unwrap_or(""))
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_source_query() {
        let meta = MediaMeta {
            title: "Pelíšky".to_string(),
            year: Some("1999".to_string()),
            ..Default::default()
        };
        assert_eq!(meta.source_query(), "Pelíšky 1999");
        assert_eq!(MediaMeta::bare("Pelíšky").source_query(), "Pelíšky");
    }

    #[test]
    fn test_episode_source_query() {
        let meta = MediaMeta {
            title: "Pilot".to_string(),
            media_type: MediaKind::Episode,
            tv_show_title: Some("Dark".to_string()),
            season: Some(1),
            episode: Some(3),
            ..Default::default()
        };
        assert_eq!(meta.source_query(), "Dark S01E03");

        let broken = MediaMeta {
            season: None,
            ..meta
        };
        assert_eq!(broken.source_query(), "Dark Pilot");
    }
}
