//! Candidate classification and ranking.

use super::tables::{DUB_MARKERS, QUALITY_RULES, SIZE_UNITS};
use crate::models::candidate::{CandidateResult, Quality};
use crate::models::config::SearchConfig;
use regex::Regex;
use std::sync::LazyLock;

static DUB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("(?i){}", DUB_MARKERS.join("|"))).expect("dub marker table compiles")
});

static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([\d.]+)\s*(KB|MB|GB|TB)").expect("static pattern"));

/// User ranking preferences, snapshotted from the config per search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingPolicy {
    /// Lowercased substrings that drop a candidate.
    pub excludes: Vec<String>,
    /// Accepted qualities; empty accepts any.
    pub preferred: Vec<Quality>,
    /// Keep dubbed candidates only.
    pub prefer_dubbed: bool,
    /// Sort by size, largest first.
    pub sort_by_size: bool,
    /// Pagination stops once this many candidates were collected.
    pub result_limit: usize,
    /// Maximum result pages fetched.
    pub search_pages: u32,
}

impl RankingPolicy {
    /// Build a policy from the search config.
    ///
    /// `ignore_quality` empties the preferred set regardless of the
    /// individual quality flags.
    pub fn from_config(config: &SearchConfig) -> Self {
        let excludes = [
            &config.exclude_suffix,
            &config.exclude_lang,
            &config.exclude_quality,
        ]
        .into_iter()
        .flat_map(|s| s.split(','))
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

        let mut preferred = Vec::new();
        if config.quality_1080p {
            preferred.push(Quality::P1080);
        }
        if config.quality_720p {
            preferred.push(Quality::P720);
        }
        if config.quality_480p {
            preferred.push(Quality::P480);
        }
        if config.ignore_quality {
            preferred.clear();
        }

        Self {
            excludes,
            preferred,
            prefer_dubbed: config.prefer_dubbed,
            sort_by_size: config.sort_by_size,
            result_limit: config.result_limit,
            search_pages: config.search_pages,
        }
    }
}

/// Quality tag from title substrings, first matching rule wins.
pub fn classify_quality(title: &str) -> Quality {
    let lower = title.to_lowercase();
    QUALITY_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, quality)| *quality)
        .unwrap_or(Quality::Unknown)
}

/// Whether the title carries a dub marker.
pub fn is_dubbed(title: &str) -> bool {
    DUB_RE.is_match(title)
}

/// Parse a size label such as "1.5 GB" or "700,5 MB" into bytes.
///
/// Unparsable labels are zero.
pub fn size_to_bytes(size: &str) -> u64 {
    let normalized = size.replace(',', ".").to_uppercase();

    let Some(caps) = SIZE_RE.captures(&normalized) else {
        return 0;
    };
    let Ok(value) = caps[1].parse::<f64>() else {
        return 0;
    };
    let multiplier = SIZE_UNITS
        .iter()
        .find(|(unit, _)| *unit == &caps[2])
        .map(|(_, m)| *m)
        .unwrap_or(0);

    (value * multiplier as f64) as u64
}

/// Annotate a candidate with quality, dub flag and size.
pub fn classify(mut candidate: CandidateResult) -> CandidateResult {
    candidate.quality = classify_quality(&candidate.title);
    candidate.is_dubbed = is_dubbed(&candidate.title);
    candidate.size_bytes = size_to_bytes(&candidate.size_str);
    candidate
}

/// Exclude, classify, filter by preference and optionally sort.
///
/// The output is not truncated.
pub fn rank(candidates: Vec<CandidateResult>, policy: &RankingPolicy) -> Vec<CandidateResult> {
    let total = candidates.len();

    let mut ranked: Vec<CandidateResult> = candidates
        .into_iter()
        .filter(|c| {
            let title = c.title.to_lowercase();
            !policy.excludes.iter().any(|ex| title.contains(ex.as_str()))
        })
        .map(classify)
        .filter(|c| !policy.prefer_dubbed || c.is_dubbed)
        .filter(|c| policy.preferred.is_empty() || policy.preferred.contains(&c.quality))
        .collect();

    if policy.sort_by_size {
        // sort_by is stable
        ranked.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
    }

    tracing::debug!("Ranked {} of {} candidates", ranked.len(), total);
    ranked
}
