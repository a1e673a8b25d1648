//! Optional delivery of hits to chat webhooks.
//!
//! Channels are enabled by env vars; an unset var simply disables that
//! channel. Delivery happens after the seen-state is saved, so a failed
//! send is logged and never turns a run into a failure.

pub mod discord;
pub mod slack;

use anyhow::Result;
use std::time::Duration;

use crate::pipeline::{Hit, Report};

pub use discord::DiscordNotifier;
pub use slack::SlackNotifier;

pub const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
pub const ENV_DISCORD_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, hits: &[Hit]) -> Result<()>;
}

/// Fans a report out to every configured channel.
#[derive(Default)]
pub struct NotifierMux {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mut mux = Self::new();
        if let Some(url) = env_url(ENV_SLACK_WEBHOOK_URL) {
            mux = mux.with(SlackNotifier::new(url).with_timeout(DEFAULT_TIMEOUT));
        }
        if let Some(url) = env_url(ENV_DISCORD_WEBHOOK_URL) {
            mux = mux.with(DiscordNotifier::new(url).with_timeout(DEFAULT_TIMEOUT));
        }
        mux
    }

    pub fn with<N: Notifier + 'static>(mut self, n: N) -> Self {
        self.channels.push(Box::new(n));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Deliver matches; `NoMatches` is not sent anywhere. Returns how many channels succeeded.
    pub async fn notify(&self, report: &Report) -> usize {
        let Report::Matches(hits) = report else {
            return 0;
        };
        let mut ok = 0;
        for ch in &self.channels {
            match ch.send(hits).await {
                Ok(()) => {
                    tracing::info!(channel = ch.name(), hits = hits.len(), "notification sent");
                    ok += 1;
                }
                Err(e) => tracing::error!(channel = ch.name(), error = ?e, "notification failed"),
            }
        }
        ok
    }
}

fn env_url(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Join hit lines, cutting at a line boundary to stay under `max_chars`.
pub(crate) fn hit_lines(hits: &[Hit], max_chars: usize) -> String {
    let mut out = String::new();
    for (i, h) in hits.iter().enumerate() {
        let line = h.to_string();
        let extra = if out.is_empty() { 0 } else { 1 };
        if out.chars().count() + extra + line.chars().count() > max_chars {
            let rest = hits.len() - i;
            let more = format!("\n… and {rest} more");
            if out.chars().count() + more.chars().count() <= max_chars {
                out.push_str(&more);
            }
            break;
        }
        if extra == 1 {
            out.push('\n');
        }
        out.push_str(&line);
    }
    out
}
