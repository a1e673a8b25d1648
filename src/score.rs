//! Keyword scoring.
//!
//! Each skill keyword found in `"{title} {description}"` (case-insensitive
//! substring) adds [`SKILL_WEIGHT`]; each exclude keyword found subtracts
//! [`EXCLUDE_PENALTY`]. The sum is clamped to `[0, 1]` once, at the end.
//! Presence counts, not occurrences.

use crate::config::Profile;
use crate::ingest::types::Item;

pub const SKILL_WEIGHT: f64 = 0.05;
pub const EXCLUDE_PENALTY: f64 = 0.30;

/// Result of scoring one item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relevance {
    pub score: f64,
    /// Skill keywords found in the text.
    pub matched: Vec<String>,
    /// Exclude keywords found in the text.
    pub excluded: Vec<String>,
}

/// The text keywords are searched in.
pub fn search_text(item: &Item) -> String {
    format!("{} {}", item.title, item.description).to_lowercase()
}

/// Score `item` against `profile`, keeping which keywords fired.
pub fn evaluate(item: &Item, profile: &Profile) -> Relevance {
    let text = search_text(item);

    let matched: Vec<String> = found_in(&text, &profile.skills_keywords);
    let excluded: Vec<String> = found_in(&text, &profile.exclude_keywords);

    let mut raw = 0.0f64;
    for _ in &matched {
        raw += SKILL_WEIGHT;
    }
    for _ in &excluded {
        raw -= EXCLUDE_PENALTY;
    }

    Relevance {
        score: raw.clamp(0.0, 1.0),
        matched,
        excluded,
    }
}

/// Pure score in `[0, 1]`.
pub fn score(item: &Item, profile: &Profile) -> f64 {
    evaluate(item, profile).score
}

fn found_in(text: &str, keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .filter(|kw| text.contains(kw.to_lowercase().as_str()))
        .cloned()
        .collect()
}
