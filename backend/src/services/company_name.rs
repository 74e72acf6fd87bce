//! Best-effort extraction of the counterparty organization name from raw
//! contract text. Used only to decorate the email subject line, so false
//! negatives (empty string) are fine and expected on atypical phrasing.

use once_cell::sync::Lazy;
use regex::Regex;

/// Phrase patterns for the common "Party A and Party B" preamble, tried in
/// order; the first match wins.
static PHRASE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)by\s+and\s+between\s+(.+?)\s+and\b",
        r"(?i)entered\s+into\s+by\s+(.+?)\s+and\b",
        r"(?i)\bbetween\s+(.+?)\s+and\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("phrase pattern must compile"))
    .collect()
});

/// Fallback: a capitalized run terminated by a corporate suffix marker.
static SUFFIX_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b((?:[A-Z][A-Za-z0-9&'.-]*\s+)+(?:Inc\.?|LLC|Ltd\.?|Corporation|Company))\b")
        .expect("suffix pattern must compile")
});

/// Boilerplate party label that the phrase patterns routinely mis-capture.
const EXCLUDED_PREFIX: &str = "the parties";

const MAX_NAME_WORDS: usize = 6;

/// Scans contract text for the main company name. Returns an empty string
/// when nothing plausible is found; never errors.
pub fn detect_company_name(contract_text: &str) -> String {
    for pattern in PHRASE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(contract_text) {
            if let Some(m) = caps.get(1) {
                let candidate = clean_candidate(m.as_str());
                if is_plausible(&candidate) {
                    return candidate;
                }
            }
        }
    }

    if let Some(caps) = SUFFIX_PATTERN.captures(contract_text) {
        if let Some(m) = caps.get(1) {
            return clean_candidate(m.as_str());
        }
    }

    String::new()
}

fn clean_candidate(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| matches!(c, '"' | '\u{201c}' | '\u{201d}' | '\''))
        .trim_end_matches(|c| matches!(c, ',' | '.' | ';' | ':'))
        .trim()
        .to_string()
}

fn is_plausible(candidate: &str) -> bool {
    if candidate.is_empty() {
        return false;
    }
    if candidate.split_whitespace().count() > MAX_NAME_WORDS {
        return false;
    }
    !candidate.to_lowercase().starts_with(EXCLUDED_PREFIX)
}
