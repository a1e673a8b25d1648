// src/config/sources.rs
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::errors::{ConfigError, SourceError};
use crate::ingest::types::SourceKind;

pub const UNKNOWN_SOURCE_NAME: &str = "Unknown source";

fn default_timeout_secs() -> u64 {
    20
}

/// One configured source as written by the user.
///
/// `type` and `url` stay optional here: a half-configured source is skipped
/// at run time, it does not invalidate the whole file.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A source that passed validation and can be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub name: String,
    pub kind: SourceKind,
    pub url: String,
}

impl SourceEntry {
    pub fn new(name: &str, kind: &str, url: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            kind: Some(kind.to_string()),
            url: Some(url.to_string()),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_SOURCE_NAME)
    }

    /// Validate into a fetchable source. Missing fields are checked before the type value.
    pub fn resolve(&self) -> Result<SourceSpec, SourceError> {
        let kind = present(&self.kind).ok_or(SourceError::MissingField("type"))?;
        let url = present(&self.url).ok_or(SourceError::MissingField("url"))?;
        let kind: SourceKind = kind.parse()?;
        Ok(SourceSpec {
            name: self.display_name().to_string(),
            kind,
            url: url.to_string(),
        })
    }
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// The sources document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourcesFile {
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    /// Per-fetch timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourcesFile {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SourcesFile {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Load the source list. Accepts `{sources: [...]}` or a bare list of entries.
pub fn load_sources_from(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = super::read_config(path)?;
    let file = match super::parse_document::<SourcesFile>(path, &content) {
        Ok(f) => f,
        Err(message) => match super::parse_document::<Vec<SourceEntry>>(path, &content) {
            Ok(sources) => SourcesFile {
                sources,
                ..SourcesFile::default()
            },
            Err(_) => {
                return Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    message,
                })
            }
        },
    };

    if file.timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            message: "timeout_secs must be greater than zero".to_string(),
        });
    }
    Ok(file)
}
