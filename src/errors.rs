//! Error taxonomy for a watch run.
//!
//! Only [`ConfigError`] and [`StateError`] can end a run (wrapped in
//! [`RunError`]). Everything a single source can go wrong with is a
//! [`SourceError`], which the pipeline downgrades to a logged warning.

use std::path::PathBuf;

use thiserror::Error;

/// Profile or source configuration could not be loaded. Fatal, raised before any fetch.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no {what} configuration found (tried {tried})")]
    Missing { what: &'static str, tried: String },

    #[error("reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid value in {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Per-source failure. Never aborts a run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source is missing `{0}`")]
    MissingField(&'static str),

    #[error("unknown source type `{0}`")]
    UnknownKind(String),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("server answered {status} for {url}")]
    Status { status: u16, url: String },

    #[error("could not parse content: {0}")]
    Parse(String),
}

impl SourceError {
    /// Configuration problems are reported at WARN, transport/content problems at ERROR.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::UnknownKind(_))
    }
}

/// Seen-state could not be read or written.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("reading seen-state {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("seen-state {} is corrupt: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },

    #[error("persisting seen-state {}: {message}", path.display())]
    Persist { path: PathBuf, message: String },
}

/// Run-terminating failure.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),
}

impl RunError {
    /// Process exit code for the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::State(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_problems_are_distinguished_from_fetch_problems() {
        assert!(SourceError::MissingField("url").is_config());
        assert!(SourceError::UnknownKind("ftp".into()).is_config());
        assert!(!SourceError::Fetch("timeout".into()).is_config());
        assert!(!SourceError::Status {
            status: 503,
            url: "https://x".into()
        }
        .is_config());
    }

    #[test]
    fn exit_codes_separate_config_from_state() {
        let cfg = RunError::from(ConfigError::Missing {
            what: "profile",
            tried: "profile.yaml".into(),
        });
        let st = RunError::from(StateError::Persist {
            path: "seen.json".into(),
            message: "disk full".into(),
        });
        assert_eq!(cfg.exit_code(), 2);
        assert_eq!(st.exit_code(), 1);
    }
}
