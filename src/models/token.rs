//! Structured tokens extracted from a free-text query.

use serde::{Deserialize, Serialize};

/// Result of query normalization, used for metadata lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchToken {
    /// Title with diacritics, markers and junk words removed.
    pub cleaned_title: String,
    /// Four-digit year (1980-2099).
    pub year: Option<String>,
    /// Season from an `SxxExx` marker.
    pub season: Option<u32>,
    /// Episode from an `SxxExx` marker.
    pub episode: Option<u32>,
    /// Range end from an `SxxExx-yy` marker.
    pub episode_end: Option<u32>,
}

impl SearchToken {
    /// Whether a season/episode marker was found.
    pub fn is_episode(&self) -> bool {
        self.season.is_some() && self.episode.is_some()
    }
}
