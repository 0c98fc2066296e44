//! Daily TV tip models.

use serde::{Deserialize, Serialize};

/// Tip reference scraped from the daily list, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipRef {
    /// CSFD film ID.
    pub id: String,
    /// Broadcast time, "HH:MM".
    pub time: Option<String>,
    /// Broadcasting channel.
    pub channel: Option<String>,
}

/// Film detail scraped from CSFD and enriched with TMDB artwork.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilmDetail {
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub year: Option<String>,
    /// Rating label, e.g. "78%".
    pub rating: Option<String>,
    pub genres: Vec<String>,
    pub plot: Option<String>,
    pub poster: Option<String>,
    pub fanart: Option<String>,
}

impl FilmDetail {
    /// Rating as a 0-10 score, parsed from the percentage label.
    pub fn rating_score(&self) -> Option<f32> {
        let value: f32 = self.rating.as_deref()?.trim().trim_end_matches('%').parse().ok()?;
        Some(value / 10.0)
    }

    /// Query used to search the video site for this film.
    pub fn search_query(&self) -> Option<String> {
        let title = self.title.as_deref()?;
        Some(
            format!("{} {}", title, self.year.as_deref().unwrap_or(""))
                .trim()
                .to_string(),
        )
    }
}

/// One enriched daily tip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    pub id: String,
    pub time: Option<String>,
    pub channel: Option<String>,
    #[serde(flatten)]
    pub detail: FilmDetail,
}
