//! Query normalizer.
//!
//! Turns a free-text query such as `"Show.Name.S01E02.1080p.CZ.dabing"` into a
//! [`SearchToken`] used for metadata lookup. The literal site query is built
//! separately (see [`pad_episode_markers`]).
//!
//! Steps run in a fixed order because later patterns can overlap earlier
//! ones (a year-like number inside a release tag, for example):
//!
//! 1. `_`, `.` and `+` become spaces
//! 2. diacritics are stripped
//! 3. `SxxExx` / `SxxExx-yy` is captured and removed
//! 4. a 1980-2099 year is captured and removed
//! 5. junk words are removed
//! 6. bracketed groups are removed
//! 7. whitespace is collapsed
//!
//! Cleaning repeats on its own output until the title is stable, so the
//! returned title never contains further extractable tokens.

use super::tables::JUNK_WORDS;
use crate::models::token::SearchToken;
use crate::utils::text::strip_diacritics;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static EPISODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[Ss]([0-9]{1,2})[Ee]([0-9]{1,2})(?:-([0-9]{1,2}))?\b").expect("static pattern")
});

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19[89][0-9]|20[0-9]{2})\b").expect("static pattern"));

static BRACKETS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\(\[\{].*?[\)\]\}]").expect("static pattern"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static pattern"));

static PAD_EPISODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bS([0-9]{1,2})E([0-9]{1,2})\b").expect("static pattern")
});

static DEFAULT_NORMALIZER: LazyLock<QueryNormalizer> = LazyLock::new(|| {
    QueryNormalizer::with_junk_words(JUNK_WORDS).expect("junk word table compiles")
});

/// Query normalizer with a configurable junk-word table.
#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    junk: Option<Regex>,
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        DEFAULT_NORMALIZER.clone()
    }
}

impl QueryNormalizer {
    /// Build a normalizer that removes the given junk words.
    pub fn with_junk_words(words: &[&str]) -> crate::Result<Self> {
        let words: Vec<String> = words
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .map(regex::escape)
            .collect();

        if words.is_empty() {
            return Ok(Self { junk: None });
        }

        let pattern = format!(r"(?i)\b(?:{})\b", words.join("|"));
        let junk = Regex::new(&pattern)
            .map_err(|e| crate::Error::InvalidConfig(format!("junk word table: {}", e)))?;
        Ok(Self { junk: Some(junk) })
    }

    /// Normalize a query. Never fails; missing tokens are `None`.
    pub fn normalize(&self, query: &str) -> SearchToken {
        tracing::debug!("Normalizing query: '{}'", query);

        // A pass that changes the title always shortens it, so this ends.
        let mut token = self.clean_once(query);
        loop {
            let refined = self.clean_once(&token.cleaned_title).cleaned_title;
            if refined == token.cleaned_title {
                break;
            }
            token.cleaned_title = refined;
        }

        tracing::debug!(
            "Normalized: title='{}', year={:?}, season={:?}, episode={:?}, episode_end={:?}",
            token.cleaned_title,
            token.year,
            token.season,
            token.episode,
            token.episode_end
        );
        token
    }

    /// One pass of the seven cleaning steps.
    fn clean_once(&self, query: &str) -> SearchToken {
        let mut token = SearchToken::default();

        // 1. separators
        let title: String = query
            .chars()
            .map(|c| if matches!(c, '_' | '.' | '+') { ' ' } else { c })
            .collect();

        // 2. diacritics
        let mut title = strip_diacritics(&title);

        // 3. season/episode
        if let Some(caps) = EPISODE_RE.captures(&title) {
            token.season = caps.get(1).and_then(|m| m.as_str().parse().ok());
            token.episode = caps.get(2).and_then(|m| m.as_str().parse().ok());
            token.episode_end = caps.get(3).and_then(|m| m.as_str().parse().ok());
            let matched = caps[0].to_string();
            title = remove_literal(&title, &matched, true);
        }

        // 4. year
        if let Some(caps) = YEAR_RE.captures(&title) {
            let year = caps[1].to_string();
            title = remove_literal(&title, &year, false);
            token.year = Some(year);
        }

        // 5. junk words
        if let Some(ref junk) = self.junk {
            title = junk.replace_all(&title, "").into_owned();
        }

        // 6. bracketed groups
        title = BRACKETS_RE.replace_all(&title, "").into_owned();

        // 7. whitespace
        token.cleaned_title = WHITESPACE_RE.replace_all(&title, " ").trim().to_string();
        token
    }
}

/// Remove every occurrence of `needle`. Case-insensitive matching removes
/// anywhere; case-sensitive matching removes only whole words.
fn remove_literal(haystack: &str, needle: &str, case_insensitive: bool) -> String {
    let pattern = if case_insensitive {
        format!("(?i){}", regex::escape(needle))
    } else {
        format!(r"\b{}\b", regex::escape(needle))
    };

    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(haystack, "").into_owned(),
        Err(_) => haystack.replace(needle, ""),
    }
}

/// Normalize a query with the default junk-word table.
pub fn normalize(query: &str) -> SearchToken {
    DEFAULT_NORMALIZER.normalize(query)
}

/// Zero-pad episode markers for the site query: `S1E2` becomes `S01E02`.
pub fn pad_episode_markers(query: &str) -> String {
    PAD_EPISODE_RE
        .replace_all(query, |caps: &Captures| {
            let season: u32 = caps[1].parse().unwrap_or(0);
            let episode: u32 = caps[2].parse().unwrap_or(0);
            format!("S{:02}E{:02}", season, episode)
        })
        .into_owned()
}
