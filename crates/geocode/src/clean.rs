//! City-name cleanup.
//!
//! Reverse-geocoding services return administrative names ("Municipality of
//! Thessaloniki", "Hlavní město Praha") that make poor filename tokens. Clean
//! them once, before they are cached, so every later cache hit is clean too.

/// Stripped case-insensitively. Longer prefixes come first where one is the
/// tail of another.
const PREFIXES: &[&str] = &[
    "Capital City of ",
    "City of ",
    "Municipality of ",
    "Municipal Unit of ",
    "Borough of ",
    "Town of ",
    "Village of ",
    "District of ",
    "County of ",
    "Province of ",
    "State of ",
    "Region of ",
    "Stadt ",
    "Gemeinde ",
    "Kreis ",
    "Ville de ",
    "Commune de ",
    "Ciudad de ",
    "Municipio de ",
    "Città di ",
    "Comune di ",
    "Cidade de ",
    "Município de ",
    "Gemeente ",
    "Hlavní město ",
    "Miasto ",
    "Gmina ",
];

/// Greek administrative prefixes, matched exactly.
const GREEK_PREFIXES: &[&str] = &["Δημοτική Κοινότητα ", "Δήμος "];

/// Whole names with a well-known transliteration, matched exactly.
const GREEK_NAMES: &[(&str, &str)] = &[("Δημοτική Κοινότητα Καρλοβασίου", "Karlovasi")];

const SUFFIXES: &[&str] = &[
    " Municipality",
    " City",
    " Borough",
    " District",
    " County",
    " Province",
    " Region",
    " Metropolitan Area",
    " Metro Area",
    " Urban Area",
];

/// Local names mapped to the English exonym, keyed in lowercase.
const EXONYMS: &[(&str, &str)] = &[
    ("prague", "Prague"),
    ("praha", "Prague"),
    ("wien", "Vienna"),
    ("münchen", "Munich"),
    ("köln", "Cologne"),
    ("firenze", "Florence"),
    ("roma", "Rome"),
    ("milano", "Milan"),
    ("venezia", "Venice"),
    ("napoli", "Naples"),
    ("lisboa", "Lisbon"),
    ("warszawa", "Warsaw"),
    ("moskva", "Moscow"),
    ("sankt-peterburg", "Saint Petersburg"),
    ("new york city", "New York"),
];

/// Qualifier words dropped from whatever is left.
const QUALIFIERS: &[&str] =
    &["administrative", "admin", "metropolitan", "metro", "urban", "greater", "central", "downtown", "inner", "outer"];

/// Reduces an administrative place name to a plain city name.
///
/// Never returns an empty string for non-empty input: if cleanup would remove
/// everything, the trimmed original is returned instead.
pub fn clean_city_name(raw: &str) -> String {
    let original = raw.trim();
    if let Some((_, name)) = GREEK_NAMES.iter().find(|(greek, _)| *greek == original) {
        return (*name).to_string();
    }

    let mut name = original;
    if let Some(rest) = PREFIXES.iter().find_map(|prefix| strip_prefix_ignore_case(name, prefix)) {
        name = rest;
    } else if let Some(rest) = GREEK_PREFIXES.iter().find_map(|prefix| name.strip_prefix(prefix)) {
        name = rest;
    }
    if let Some(rest) = SUFFIXES.iter().find_map(|suffix| strip_suffix_ignore_case(name, suffix)) {
        name = rest;
    }
    let name = name.trim();

    let lower = name.to_lowercase();
    if let Some((_, exonym)) = EXONYMS.iter().find(|(local, _)| *local == lower) {
        return (*exonym).to_string();
    }

    let words: Vec<&str> = name
        .split_whitespace()
        .filter(|word| !QUALIFIERS.iter().any(|q| word.eq_ignore_ascii_case(q)))
        .collect();
    let cleaned = if words.is_empty() { name.to_string() } else { words.join(" ") };
    if cleaned.is_empty() { original.to_string() } else { cleaned }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let end = s.char_indices().nth(prefix.chars().count()).map_or(s.len(), |(i, _)| i);
    let head = &s[..end];
    (head.chars().count() == prefix.chars().count() && head.to_lowercase() == prefix.to_lowercase())
        .then(|| &s[end..])
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let count = suffix.chars().count();
    let start = s.char_indices().rev().nth(count.checked_sub(1)?).map(|(i, _)| i)?;
    let tail = &s[start..];
    (tail.to_lowercase() == suffix.to_lowercase()).then(|| &s[..start])
}
