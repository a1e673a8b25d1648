// src/ingest/fetch.rs
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::SourceError;
use crate::ingest::types::Fetcher;

const USER_AGENT: &str = concat!("job-watch/", env!("CARGO_PKG_VERSION"));

/// Plain GET over reqwest. One attempt per URL; a timeout is just another fetch error.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, SourceError> {
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| SourceError::Fetch(describe(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        resp.text()
            .await
            .map_err(|e| SourceError::Fetch(format!("reading body: {}", describe(&e))))
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timed out: {e}")
    } else {
        e.to_string()
    }
}

/// Serves fixed bodies by URL. Used by tests and offline dry runs.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn insert(&mut self, url: &str, body: &str) {
        self.pages.insert(url.to_string(), body.to_string());
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, SourceError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| SourceError::Fetch(format!("no route to {url}")))
    }
}
