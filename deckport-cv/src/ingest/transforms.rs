//! Per-field normalization tables
//!
//! Every dialect spells conditions, languages, and finishes differently;
//! these tables fold them onto one canonical vocabulary. Unknown values
//! pass through untouched so downstream stages can warn instead of losing
//! data.

use crate::models::Finish;
use once_cell::sync::Lazy;
use std::collections::HashMap;

static CONDITIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("m", "Mint"),
        ("mint", "Mint"),
        ("nm", "Near Mint"),
        ("near mint", "Near Mint"),
        ("nearmint", "Near Mint"),
        ("near-mint", "Near Mint"),
        ("nm-mint", "Near Mint"),
        ("mint/near mint", "Near Mint"),
        ("ex", "Excellent"),
        ("excellent", "Excellent"),
        ("lp", "Lightly Played"),
        ("lightly played", "Lightly Played"),
        ("light play", "Lightly Played"),
        ("slightly played", "Lightly Played"),
        ("sp", "Lightly Played"),
        ("good", "Good"),
        ("gd", "Good"),
        ("mp", "Moderately Played"),
        ("moderately played", "Moderately Played"),
        ("played", "Played"),
        ("pl", "Played"),
        ("hp", "Heavily Played"),
        ("heavily played", "Heavily Played"),
        ("heavy play", "Heavily Played"),
        ("poor", "Damaged"),
        ("dmg", "Damaged"),
        ("damaged", "Damaged"),
    ])
});

static LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("en", "en"),
        ("english", "en"),
        ("es", "es"),
        ("sp", "es"),
        ("spanish", "es"),
        ("fr", "fr"),
        ("french", "fr"),
        ("de", "de"),
        ("ger", "de"),
        ("german", "de"),
        ("it", "it"),
        ("italian", "it"),
        ("pt", "pt"),
        ("portuguese", "pt"),
        ("ja", "ja"),
        ("jp", "ja"),
        ("japanese", "ja"),
        ("ko", "ko"),
        ("kr", "ko"),
        ("korean", "ko"),
        ("ru", "ru"),
        ("russian", "ru"),
        ("zhs", "zhs"),
        ("cs", "zhs"),
        ("chinese", "zhs"),
        ("chinese simplified", "zhs"),
        ("s-chinese", "zhs"),
        ("simplified chinese", "zhs"),
        ("zht", "zht"),
        ("ct", "zht"),
        ("chinese traditional", "zht"),
        ("t-chinese", "zht"),
        ("traditional chinese", "zht"),
        ("ph", "ph"),
        ("phyrexian", "ph"),
        ("la", "la"),
        ("latin", "la"),
    ])
});

/// Normalize a condition string to the canonical vocabulary
///
/// Unknown values pass through as given.
pub fn normalize_condition(raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    if key.is_empty() {
        return String::new();
    }
    CONDITIONS
        .get(key.as_str())
        .map(|c| c.to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}

/// Normalize a language to its canonical code
///
/// Returns `None` for unrecognized values; callers keep the raw value and
/// let language validation warn about it.
pub fn normalize_language(raw: &str) -> Option<&'static str> {
    let key = raw.trim().to_lowercase();
    LANGUAGES.get(key.as_str()).copied()
}

/// Parse a finish column value
pub fn parse_finish(raw: &str) -> Finish {
    match raw.trim().to_lowercase().as_str() {
        "foil" | "yes" | "true" | "1" | "f" => Finish::Foil,
        "etched" | "foil-etched" | "etched foil" | "foil etched" => Finish::Etched,
        _ => Finish::Nonfoil,
    }
}

/// Parse a count value; absent/garbled counts default to 1
///
/// Tools write "4", "4x", or "x4"; anything that yields zero or nothing
/// becomes 1 (count >= 1 always holds).
pub fn parse_count(raw: &str) -> u32 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.parse::<u32>() {
        Ok(n) if n >= 1 => n,
        _ => 1,
    }
}

/// Normalize a vendor price field
///
/// Strips surrounding whitespace and currency symbols; the numeric text is
/// otherwise passed through verbatim (it is a pass-through field, not an
/// arithmetic input).
pub fn normalize_price(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(['$', '€', '£'])
        .trim()
        .to_string()
}

/// Clean a collector number (strip leading '#', surrounding whitespace)
pub fn clean_collector_number(raw: &str) -> String {
    raw.trim().trim_start_matches('#').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_aliases() {
        assert_eq!(normalize_condition("NM"), "Near Mint");
        assert_eq!(normalize_condition("near mint"), "Near Mint");
        assert_eq!(normalize_condition("SP"), "Lightly Played");
        assert_eq!(normalize_condition("hp"), "Heavily Played");
    }

    #[test]
    fn test_unknown_condition_passes_through() {
        assert_eq!(normalize_condition("Binder Fresh"), "Binder Fresh");
    }

    #[test]
    fn test_language_aliases() {
        assert_eq!(normalize_language("English"), Some("en"));
        assert_eq!(normalize_language("jp"), Some("ja"));
        assert_eq!(normalize_language("Japanese"), Some("ja"));
        assert_eq!(normalize_language("T-Chinese"), Some("zht"));
        assert_eq!(normalize_language("klingon"), None);
    }

    #[test]
    fn test_parse_finish() {
        assert_eq!(parse_finish("foil"), Finish::Foil);
        assert_eq!(parse_finish("Yes"), Finish::Foil);
        assert_eq!(parse_finish("etched"), Finish::Etched);
        assert_eq!(parse_finish(""), Finish::Nonfoil);
        assert_eq!(parse_finish("normal"), Finish::Nonfoil);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("4"), 4);
        assert_eq!(parse_count("4x"), 4);
        assert_eq!(parse_count("x12"), 12);
        assert_eq!(parse_count(""), 1);
        assert_eq!(parse_count("0"), 1);
        assert_eq!(parse_count("junk"), 1);
    }

    #[test]
    fn test_normalize_price() {
        assert_eq!(normalize_price("$1.50"), "1.50");
        assert_eq!(normalize_price("€2,50"), "2,50");
        assert_eq!(normalize_price(" $ 12.00 "), "12.00");
        assert_eq!(normalize_price(""), "");
    }

    #[test]
    fn test_clean_collector_number() {
        assert_eq!(clean_collector_number(" #123 "), "123");
        assert_eq!(clean_collector_number("123a"), "123a");
    }
}
