// src/ingest/types.rs
use std::fmt;
use std::str::FromStr;

use crate::errors::SourceError;

/// A candidate posting. `link` is the dedupe key and is compared verbatim.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq, Default)]
pub struct Item {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl Item {
    pub fn new(title: &str, link: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            link: link.to_string(),
            description: description.to_string(),
        }
    }
}

/// How a source's content is turned into items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Rss,
    Html,
}

impl FromStr for SourceKind {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rss" => Ok(Self::Rss),
            "html" => Ok(Self::Html),
            _ => Err(SourceError::UnknownKind(s.trim().to_string())),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rss => "rss",
            Self::Html => "html",
        })
    }
}

/// Blocking-style "give me the body at this URL" capability.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, SourceError>;
}
