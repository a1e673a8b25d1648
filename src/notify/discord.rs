use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{hit_lines, Notifier};
use crate::pipeline::Hit;

// Discord rejects embed descriptions over 4096 chars.
const MAX_DESCRIPTION_CHARS: usize = 4_000;

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
}

impl DiscordNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn send(&self, hits: &[Hit]) -> Result<()> {
        let payload = DiscordWebhookPayload::for_hits(hits);

        let rsp = self
            .client
            .post(&self.webhook)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| anyhow!("Discord webhook request failed: {e}"))?;

        if let Err(e) = rsp.error_for_status_ref() {
            return Err(anyhow!("Discord webhook HTTP error: {e}"));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
}

#[derive(Serialize)]
struct DiscordWebhookPayload {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

impl DiscordWebhookPayload {
    fn for_hits(hits: &[Hit]) -> Self {
        Self {
            content: None,
            embeds: vec![DiscordEmbed {
                title: format!("New matching jobs: {}", hits.len()),
                description: hit_lines(hits, MAX_DESCRIPTION_CHARS),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::Item;

    #[test]
    fn payload_has_one_embed_with_all_lines() {
        let hits = vec![
            Hit {
                score: 0.9,
                item: Item::new("Curator", "https://m/1", ""),
                source: "Museum".into(),
                matched: vec!["curator".into()],
            },
            Hit {
                score: 0.4,
                item: Item::new("Archivist", "https://m/2", ""),
                source: "Museum".into(),
                matched: vec![],
            },
        ];
        let v = serde_json::to_value(DiscordWebhookPayload::for_hits(&hits)).unwrap();
        assert_eq!(v["content"], serde_json::Value::Null);
        assert_eq!(v["embeds"][0]["title"], "New matching jobs: 2");
        assert_eq!(
            v["embeds"][0]["description"],
            "- [0.90] (Museum) Curator → https://m/1\n- [0.40] (Museum) Archivist → https://m/2"
        );
    }
}
