//! Locale-specific heuristics tables.
//!
//! These follow Czech/Slovak release naming conventions. They are plain data
//! so that extending them never touches the pipeline code.

use crate::models::candidate::Quality;

/// Words dropped from a query before metadata lookup (whole word,
/// case-insensitive). Language/dub markers, resolutions, sources, codecs and
/// release tags.
pub const JUNK_WORDS: &[&str] = &[
    "cz", "czdab", "dab", "dabing", "czaudio", "dd", "hevc",
    "1080p", "720p", "2160p", "4k", "hd", "fullhd", "ultra hd", "uhd",
    "topkvalita", "web-dl", "webrip", "bluray", "dvdrip",
    "final", "komplet", "x264", "x265", "amzn",
];

/// Regex fragments marking a dubbed audio track. Matched case-insensitively
/// against candidate titles.
pub const DUB_MARKERS: &[&str] = &[
    r"cz\s*dabing",
    r"cz-dabing",
    r"český\s*dabing",
];

/// Quality rules, checked in order. The first rule with a matching substring
/// wins, so `1080p` must come before the generic `hd`.
pub const QUALITY_RULES: &[(&[&str], Quality)] = &[
    (&["1080p", "full hd"], Quality::P1080),
    (&["720p", "hd"], Quality::P720),
    (&["480p", "sd"], Quality::P480),
];

/// Size unit multipliers.
pub const SIZE_UNITS: &[(&str, u64)] = &[
    ("KB", 1024),
    ("MB", 1024 * 1024),
    ("GB", 1024 * 1024 * 1024),
    ("TB", 1024 * 1024 * 1024 * 1024),
];
