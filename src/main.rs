//! job-watch: binary entrypoint
//! Loads `.env`, resolves config paths, runs one watch pass, prints the
//! report to stdout and optionally pushes hits to chat webhooks.
//!
//! Exit codes: 0 completed (with or without warnings), 1 seen-state
//! failure, 2 configuration failure.

use std::process::ExitCode;

use job_watch::metrics::Metrics;
use job_watch::notify::NotifierMux;
use job_watch::{run_from_settings, RunStatus, Settings};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logs go to stderr so stdout carries only the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "configuration failed");
            return ExitCode::from(2);
        }
    };

    let metrics = match &settings.metrics_path {
        Some(_) => match Metrics::init() {
            Ok(m) => Some(m),
            Err(e) => {
                warn!(error = ?e, "metrics disabled");
                None
            }
        },
        None => None,
    };

    let outcome = match run_from_settings(&settings).await {
        Ok(o) => o,
        Err(e) => {
            error!(error = %e, "run aborted");
            return ExitCode::from(e.exit_code());
        }
    };

    println!("{}", outcome.report.render());

    if outcome.status() == RunStatus::CompletedWithWarnings {
        warn!(
            skipped = outcome.stats.sources_skipped,
            failed = outcome.stats.sources_failed,
            "completed with warnings"
        );
    }

    let mux = NotifierMux::from_env();
    if !mux.is_empty() {
        mux.notify(&outcome.report).await;
    }

    if let (Some(m), Some(path)) = (&metrics, &settings.metrics_path) {
        m.record_outcome(&outcome);
        match m.write_textfile(path) {
            Ok(()) => info!(path = %path.display(), "metrics written"),
            Err(e) => warn!(error = ?e, "writing metrics failed"),
        }
    }

    ExitCode::SUCCESS
}
