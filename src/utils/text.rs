//! Text helpers shared by the pipeline and the CLI.

use unicode_normalization::char::canonical_combining_class;
use unicode_normalization::UnicodeNormalization;

/// Strip diacritics: NFKD-decompose and drop every combining character.
///
/// "Pelíšky" becomes "Pelisky".
pub fn strip_diacritics(s: &str) -> String {
    s.nfkd()
        .filter(|c| canonical_combining_class(*c) == 0)
        .collect()
}

/// Format a byte count for display, e.g. `1.5 GB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB", "EB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

/// Parse "H:MM:SS" or "MM:SS" into seconds. Anything else is zero.
pub fn duration_to_seconds(duration: &str) -> u64 {
    let parts: Vec<&str> = duration.trim().split(':').collect();
    let numbers: Option<Vec<u64>> = parts.iter().map(|p| p.trim().parse().ok()).collect();

    let total = match numbers.as_deref() {
        Some([h, m, s]) => h
            .checked_mul(3600)
            .and_then(|t| t.checked_add(m.checked_mul(60)?))
            .and_then(|t| t.checked_add(*s)),
        Some([m, s]) => m.checked_mul(60).and_then(|t| t.checked_add(*s)),
        _ => None,
    };
    total.unwrap_or(0)
}

/// Make a user-supplied name safe to use as a file name.
///
/// Keeps alphanumerics, space, `-`, `_` and `.`; everything else becomes `_`.
/// Trailing spaces and dots are trimmed.
pub fn sanitize_filename(name: &str) -> String {
    let safe: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    safe.trim_end_matches([' ', '.']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_diacritics() {
        assert_eq!(strip_diacritics("Pelíšky"), "Pelisky");
        assert_eq!(strip_diacritics("Český dabing"), "Cesky dabing");
        assert_eq!(strip_diacritics("plain"), "plain");
        assert_eq!(strip_diacritics(""), "");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1610612736), "1.5 GB");
    }

    #[test]
    fn test_duration_to_seconds() {
        assert_eq!(duration_to_seconds("1:30:05"), 5405);
        assert_eq!(duration_to_seconds("42:10"), 2530);
        assert_eq!(duration_to_seconds(""), 0);
        assert_eq!(duration_to_seconds("abc"), 0);
        assert_eq!(duration_to_seconds("1:2:3:4"), 0);
    }

    #[test]
    fn test_duration_overflow_is_zero() {
        let huge = "9".repeat(19);
        assert_eq!(duration_to_seconds(&format!("{}:00:00", huge)), 0);
        assert_eq!(duration_to_seconds(&format!("{}:00", huge)), 0);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Pelíšky (1999)"), "Pelíšky _1999_");
        assert_eq!(sanitize_filename("a/b:c. "), "a_b_c");
        assert_eq!(sanitize_filename("Show.S01E01"), "Show.S01E01");
    }
}
