//! # Watch Pipeline
//! One run: load seen-set → for each source (in declared order) fetch,
//! extract, drop seen links, score, collect hits → save seen-set → report.
//!
//! Strictly sequential. Per-source problems become [`SourceWarning`]s; only
//! config loading and seen-state I/O end a run early.

use chrono::{DateTime, Utc};
use metrics::counter;
use std::fmt;
use tracing::{debug, error, info, warn};

use crate::config::{Profile, SeenPolicy, Settings, SourceEntry};
use crate::errors::{RunError, SourceError};
use crate::ingest::{self, types::Fetcher, types::Item, HttpFetcher};
use crate::score;
use crate::seen::{JsonFileStore, SeenSet, SeenStore};

pub const REPORT_BANNER: &str = "=== New matching jobs ===";
pub const NO_MATCHES_LINE: &str = "No new matching jobs today.";
const NO_TITLE: &str = "(no title)";

/// An item that met the threshold in this run.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub score: f64,
    pub item: Item,
    pub source: String,
    /// Skill keywords that contributed.
    pub matched: Vec<String>,
}

impl fmt::Display for Hit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.item.title.is_empty() {
            NO_TITLE
        } else {
            self.item.title.as_str()
        };
        write!(
            f,
            "- [{:.2}] ({}) {} → {}",
            self.score, self.source, title, self.item.link
        )
    }
}

/// What a successful run found. "Nothing new" is explicit.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Sorted by score, highest first; ties keep discovery order.
    Matches(Vec<Hit>),
    NoMatches,
}

impl Report {
    fn from_hits(mut hits: Vec<Hit>) -> Self {
        if hits.is_empty() {
            return Self::NoMatches;
        }
        // stable: equal scores stay in discovery order
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        Self::Matches(hits)
    }

    pub fn hits(&self) -> &[Hit] {
        match self {
            Self::Matches(h) => h,
            Self::NoMatches => &[],
        }
    }

    /// Text printed to stdout at the end of a run.
    pub fn render(&self) -> String {
        match self {
            Self::NoMatches => NO_MATCHES_LINE.to_string(),
            Self::Matches(hits) => {
                let mut out = String::from(REPORT_BANNER);
                for h in hits {
                    out.push('\n');
                    out.push_str(&h.to_string());
                }
                out
            }
        }
    }
}

/// A source that contributed nothing to this run, and why.
#[derive(Debug)]
pub struct SourceWarning {
    pub source: String,
    pub error: SourceError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    CompletedWithWarnings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub sources_total: usize,
    pub sources_skipped: usize,
    pub sources_failed: usize,
    pub items_extracted: usize,
    pub items_skipped_no_link: usize,
    pub items_skipped_seen: usize,
    pub items_scored: usize,
    pub hits: usize,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub report: Report,
    pub warnings: Vec<SourceWarning>,
    pub stats: RunStats,
    /// Size of the seen-set after the run.
    pub seen_total: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunOutcome {
    pub fn status(&self) -> RunStatus {
        if self.warnings.is_empty() {
            RunStatus::Completed
        } else {
            RunStatus::CompletedWithWarnings
        }
    }
}

/// Borrowed collaborators for one run.
pub struct Pipeline<'a> {
    profile: &'a Profile,
    sources: &'a [SourceEntry],
    fetcher: &'a dyn Fetcher,
    store: &'a dyn SeenStore,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        profile: &'a Profile,
        sources: &'a [SourceEntry],
        fetcher: &'a dyn Fetcher,
        store: &'a dyn SeenStore,
    ) -> Self {
        Self {
            profile,
            sources,
            fetcher,
            store,
        }
    }

    pub async fn run(&self) -> Result<RunOutcome, RunError> {
        let started_at = Utc::now();
        let mut seen = self.store.load()?;
        info!(seen = seen.len(), sources = self.sources.len(), "run started");

        let mut hits = Vec::new();
        let mut warnings = Vec::new();
        let mut stats = RunStats::default();

        for entry in self.sources {
            stats.sources_total += 1;
            let name = entry.display_name().to_string();

            let spec = match entry.resolve() {
                Ok(s) => s,
                Err(e) => {
                    warn!(source = %name, error = %e, "skipping source");
                    counter!("jobwatch_sources_skipped_total").increment(1);
                    stats.sources_skipped += 1;
                    warnings.push(SourceWarning {
                        source: name,
                        error: e,
                    });
                    continue;
                }
            };

            info!(source = %spec.name, kind = %spec.kind, "fetching");
            let items = match ingest::collect(&spec, self.fetcher).await {
                Ok(v) => v,
                Err(e) => {
                    error!(source = %spec.name, url = %spec.url, error = %e, "source failed");
                    counter!("jobwatch_sources_failed_total").increment(1);
                    stats.sources_failed += 1;
                    warnings.push(SourceWarning {
                        source: spec.name,
                        error: e,
                    });
                    continue;
                }
            };

            stats.items_extracted += items.len();
            let before = hits.len();
            self.process_items(&spec.name, items, &mut seen, &mut hits, &mut stats);
            info!(
                source = %spec.name,
                new_hits = hits.len() - before,
                "source done"
            );
        }

        self.store.save(&seen)?;

        stats.hits = hits.len();
        counter!("jobwatch_items_scored_total").increment(stats.items_scored as u64);
        counter!("jobwatch_items_skipped_seen_total").increment(stats.items_skipped_seen as u64);
        counter!("jobwatch_hits_total").increment(stats.hits as u64);
        counter!("jobwatch_runs_total").increment(1);

        let outcome = RunOutcome {
            report: Report::from_hits(hits),
            warnings,
            stats,
            seen_total: seen.len(),
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            hits = outcome.stats.hits,
            scored = outcome.stats.items_scored,
            warnings = outcome.warnings.len(),
            seen = outcome.seen_total,
            "run finished"
        );
        Ok(outcome)
    }

    fn process_items(
        &self,
        source: &str,
        items: Vec<Item>,
        seen: &mut SeenSet,
        hits: &mut Vec<Hit>,
        stats: &mut RunStats,
    ) {
        for mut item in items {
            let link = item.link.trim();
            if link.is_empty() {
                stats.items_skipped_no_link += 1;
                continue;
            }
            if link.len() != item.link.len() {
                item.link = link.to_string();
            }
            if seen.contains(&item.link) {
                stats.items_skipped_seen += 1;
                continue;
            }

            let rel = score::evaluate(&item, self.profile);
            stats.items_scored += 1;
            let is_hit = rel.score >= self.profile.score_threshold;

            if is_hit || self.profile.seen_policy == SeenPolicy::All {
                seen.insert(&item.link);
            }
            if is_hit {
                debug!(
                    source,
                    link = %item.link,
                    score = rel.score,
                    matched = ?rel.matched,
                    "hit"
                );
                hits.push(Hit {
                    score: rel.score,
                    item,
                    source: source.to_string(),
                    matched: rel.matched,
                });
            }
        }
    }
}

/// Production wiring: load config (fatal, before any network), then run over
/// HTTP with the JSON seen-file.
pub async fn run_from_settings(settings: &Settings) -> Result<RunOutcome, RunError> {
    let (profile, sources) = settings.load()?;
    info!(
        profile = %settings.profile_path.display(),
        sources = %settings.sources_path.display(),
        threshold = profile.score_threshold,
        "configuration loaded"
    );

    let fetcher = HttpFetcher::new(sources.timeout());
    let store = JsonFileStore::new(&settings.seen_path);
    Pipeline::new(&profile, &sources.sources, &fetcher, &store)
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::StaticFetcher;
    use crate::seen::MemoryStore;

    fn hit(score: f64, title: &str, link: &str, source: &str) -> Hit {
        Hit {
            score,
            item: Item::new(title, link, ""),
            source: source.into(),
            matched: vec![],
        }
    }

    #[test]
    fn report_sorts_descending_and_keeps_ties_stable() {
        let r = Report::from_hits(vec![
            hit(0.10, "a", "https://a", "S"),
            hit(0.30, "b", "https://b", "S"),
            hit(0.10, "c", "https://c", "S"),
        ]);
        let order: Vec<&str> = r.hits().iter().map(|h| h.item.title.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn render_formats_lines() {
        let r = Report::from_hits(vec![
            hit(0.85, "Python Developer", "https://x/1", "Feed"),
            hit(0.8, "", "https://x/2", "Page"),
        ]);
        assert_eq!(
            r.render(),
            "=== New matching jobs ===\n\
             - [0.85] (Feed) Python Developer → https://x/1\n\
             - [0.80] (Page) (no title) → https://x/2"
        );
        assert_eq!(Report::from_hits(vec![]).render(), NO_MATCHES_LINE);
    }

    #[tokio::test]
    async fn duplicates_within_a_run_are_scored_once() {
        let page = r#"<a href="https://x/1">Python job</a><a href="https://x/1">Python job again</a>"#;
        let fetcher = StaticFetcher::new()
            .with_page("https://p1", page)
            .with_page("https://p2", page);
        let sources = vec![
            SourceEntry::new("P1", "html", "https://p1"),
            SourceEntry::new("P2", "html", "https://p2"),
        ];
        let profile = Profile::new(&["python"], &[], 0.05).unwrap();
        let store = MemoryStore::default();

        let out = Pipeline::new(&profile, &sources, &fetcher, &store)
            .run()
            .await
            .unwrap();
        assert_eq!(out.report.hits().len(), 1);
        assert_eq!(out.report.hits()[0].source, "P1");
        assert_eq!(out.stats.items_scored, 1);
        assert_eq!(out.stats.items_skipped_seen, 3);
    }

    #[tokio::test]
    async fn hits_policy_leaves_misses_unseen() {
        let page = r#"<a href="https://x/1">Python job</a><a href="https://x/2">Cook</a>"#;
        let fetcher = StaticFetcher::new().with_page("https://p", page);
        let sources = vec![SourceEntry::new("P", "html", "https://p")];
        let profile = Profile::new(&["python"], &[], 0.05)
            .unwrap()
            .with_seen_policy(SeenPolicy::Hits);
        let store = MemoryStore::default();

        Pipeline::new(&profile, &sources, &fetcher, &store)
            .run()
            .await
            .unwrap();
        let seen = store.snapshot();
        assert!(seen.contains("https://x/1"));
        assert!(!seen.contains("https://x/2"));
    }

    #[tokio::test]
    async fn whitespace_around_links_is_ignored_for_dedupe() {
        let fetcher = StaticFetcher::new().with_page(
            "https://f",
            "<rss><channel><item><title>Python</title><link>\n  https://x/1\n</link></item></channel></rss>",
        );
        let sources = vec![SourceEntry::new("F", "rss", "https://f")];
        let profile = Profile::new(&["python"], &[], 0.0).unwrap();
        let store = MemoryStore::new(["https://x/1"].into_iter().collect());

        let out = Pipeline::new(&profile, &sources, &fetcher, &store)
            .run()
            .await
            .unwrap();
        assert_eq!(out.report, Report::NoMatches);
        assert_eq!(out.status(), RunStatus::Completed);
    }
}
