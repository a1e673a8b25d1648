// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod errors;
pub mod ingest;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod score;
pub mod seen;

// ---- Re-exports for stable public API ----
pub use crate::config::{Profile, SeenPolicy, Settings, SourceEntry, SourcesFile};
pub use crate::errors::{ConfigError, RunError, SourceError, StateError};
pub use crate::ingest::types::{Fetcher, Item, SourceKind};
pub use crate::pipeline::{run_from_settings, Hit, Pipeline, Report, RunOutcome, RunStatus};
pub use crate::seen::{JsonFileStore, MemoryStore, SeenSet, SeenStore};
