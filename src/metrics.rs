use anyhow::{Context, Result};
use metrics::gauge;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::Path;

use crate::pipeline::RunOutcome;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Call once, before the run.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        Ok(Self { handle })
    }

    /// Record end-of-run gauges from `outcome`.
    pub fn record_outcome(&self, outcome: &RunOutcome) {
        gauge!("jobwatch_seen_links").set(outcome.seen_total as f64);
        gauge!("jobwatch_last_run_hits").set(outcome.stats.hits as f64);
        gauge!("jobwatch_last_run_warnings").set(outcome.warnings.len() as f64);
        gauge!("jobwatch_last_run_ts").set(outcome.finished_at.timestamp() as f64);
        let secs = (outcome.finished_at - outcome.started_at)
            .num_milliseconds()
            .max(0) as f64
            / 1_000.0;
        gauge!("jobwatch_last_run_duration_seconds").set(secs);
    }

    /// Write the exposition text for a node-exporter textfile collector.
    pub fn write_textfile(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        std::fs::write(path, self.handle.render())
            .with_context(|| format!("writing metrics to {}", path.display()))
    }
}
