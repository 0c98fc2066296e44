//! Scraped search candidates.

use serde::{Deserialize, Serialize};

/// Coarse resolution class inferred from a candidate title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl Quality {
    /// Label used in listings and config.
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::P1080 => "1080p",
            Quality::P720 => "720p",
            Quality::P480 => "480p",
            Quality::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scraped search hit.
///
/// `quality`, `is_dubbed` and `size_bytes` are filled in by the classifier;
/// a freshly scraped candidate carries their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    /// Title as shown on the site.
    pub title: String,
    /// Absolute URL of the video page.
    pub link: String,
    /// Size label, e.g. "1.4 GB".
    pub size_str: String,
    /// Duration label, "H:MM:SS" or "MM:SS".
    pub duration_str: String,
    /// Quality tag derived from the title.
    #[serde(default)]
    pub quality: Quality,
    /// Whether the title carries a dub marker.
    #[serde(default)]
    pub is_dubbed: bool,
    /// Size parsed from `size_str`, zero when unparsable.
    #[serde(default)]
    pub size_bytes: u64,
}

impl CandidateResult {
    /// Create an unclassified candidate.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        size_str: impl Into<String>,
        duration_str: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            size_str: size_str.into(),
            duration_str: duration_str.into(),
            quality: Quality::Unknown,
            is_dubbed: false,
            size_bytes: 0,
        }
    }

    /// Duration in seconds, zero when the label is missing or malformed.
    pub fn duration_seconds(&self) -> u64 {
        crate::utils::text::duration_to_seconds(&self.duration_str)
    }

    /// Listing label with optional size prefix and duration suffix. A missing
    /// or malformed duration shows as `N/A`.
    pub fn label(&self, show_size: bool, show_duration: bool) -> String {
        let mut label = String::new();
        if show_size && !self.size_str.is_empty() {
            label.push_str(&format!("[{}]  ", self.size_str));
        }
        label.push_str(&self.title);
        if show_duration {
            let duration = if self.duration_seconds() == 0 {
                "N/A"
            } else {
                self.duration_str.as_str()
            };
            label.push_str(&format!(" · {} ·", duration));
        }
        label.trim().to_string()
    }
}
