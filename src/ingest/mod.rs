// src/ingest/mod.rs
pub mod fetch;
pub mod providers;
pub mod types;

use crate::config::SourceSpec;
use crate::errors::SourceError;
use crate::ingest::types::{Fetcher, Item, SourceKind};

pub use fetch::{HttpFetcher, StaticFetcher};

/// Turn raw fetched content into items according to the source kind.
pub fn extract(kind: SourceKind, raw: &str) -> Result<Vec<Item>, SourceError> {
    match kind {
        SourceKind::Rss => providers::rss::parse_items(raw),
        SourceKind::Html => Ok(providers::html::extract_links(raw)),
    }
}

/// Fetch one source and extract its items.
pub async fn collect(spec: &SourceSpec, fetcher: &dyn Fetcher) -> Result<Vec<Item>, SourceError> {
    let body = fetcher.fetch(&spec.url).await?;
    extract(spec.kind, &body)
}
