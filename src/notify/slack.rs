use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::{hit_lines, Notifier};
use crate::pipeline::Hit;

// Slack truncates message text well above this; keep posts readable.
const MAX_TEXT_CHARS: usize = 3_500;

pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    pub fn new(url: String) -> Self {
        Self {
            webhook_url: url,
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub(crate) fn slack_text(hits: &[Hit]) -> String {
    format!(
        "*New matching jobs:* {}\n{}",
        hits.len(),
        hit_lines(hits, MAX_TEXT_CHARS)
    )
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn send(&self, hits: &[Hit]) -> Result<()> {
        let body = serde_json::json!({ "text": slack_text(hits) });

        self.client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }
}
