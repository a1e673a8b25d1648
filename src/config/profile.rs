// src/config/profile.rs
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

use crate::errors::ConfigError;

fn default_score_threshold() -> f64 {
    0.75
}

/// Which processed links are recorded in the seen-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeenPolicy {
    /// Every scored link, hit or not. A link is evaluated at most once, ever.
    #[default]
    All,
    /// Only links that met the threshold; misses are re-scored on later runs.
    Hits,
}

/// On-disk profile shape. Typos in keys are rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProfile {
    #[serde(default)]
    skills_keywords: Option<Vec<String>>,
    #[serde(default)]
    exclude_keywords: Option<Vec<String>>,
    #[serde(default = "default_score_threshold")]
    score_threshold: f64,
    #[serde(default)]
    seen_policy: SeenPolicy,
}

/// Keyword preferences and alert threshold. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Lower-cased, de-duplicated. Padding is kept.
    pub skills_keywords: Vec<String>,
    /// Lower-cased, de-duplicated. Padding is kept.
    pub exclude_keywords: Vec<String>,
    /// In `[0, 1]`.
    pub score_threshold: f64,
    pub seen_policy: SeenPolicy,
}

impl Profile {
    /// Build a profile from raw keyword lists. Fails if the threshold is not in `[0, 1]`.
    pub fn new<S: AsRef<str>>(
        skills_keywords: &[S],
        exclude_keywords: &[S],
        score_threshold: f64,
    ) -> Result<Self, String> {
        if !(0.0..=1.0).contains(&score_threshold) {
            return Err(format!(
                "score_threshold must be within [0, 1], got {score_threshold}"
            ));
        }
        Ok(Self {
            skills_keywords: clean_keywords(skills_keywords),
            exclude_keywords: clean_keywords(exclude_keywords),
            score_threshold,
            seen_policy: SeenPolicy::default(),
        })
    }

    pub fn with_seen_policy(mut self, policy: SeenPolicy) -> Self {
        self.seen_policy = policy;
        self
    }

    fn from_raw(raw: RawProfile) -> Result<Self, String> {
        let p = Self::new(
            &raw.skills_keywords.unwrap_or_default(),
            &raw.exclude_keywords.unwrap_or_default(),
            raw.score_threshold,
        )?;
        Ok(p.with_seen_policy(raw.seen_policy))
    }
}

/// Load a profile from YAML, TOML or JSON (by extension).
pub fn load_profile_from(path: &Path) -> Result<Profile, ConfigError> {
    let content = super::read_config(path)?;
    let raw: RawProfile =
        super::parse_document(path, &content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
    Profile::from_raw(raw).map_err(|message| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    })
}

/// Lower-case and de-duplicate. Blank entries are dropped since they would
/// match every text; surrounding spaces are kept, so `" art "` only matches
/// the standalone word.
fn clean_keywords<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    let mut set = BTreeSet::new();
    for it in items {
        let kw = it.as_ref();
        if !kw.trim().is_empty() {
            set.insert(kw.to_lowercase());
        }
    }
    set.into_iter().collect()
}
