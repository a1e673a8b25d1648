// src/config/mod.rs
//! Configuration loading: file discovery, format dispatch and the run settings.

pub mod profile;
pub mod sources;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::errors::ConfigError;

pub use profile::{load_profile_from, Profile, SeenPolicy};
pub use sources::{load_sources_from, SourceEntry, SourceSpec, SourcesFile};

pub const ENV_PROFILE_PATH: &str = "JOBWATCH_PROFILE_PATH";
pub const ENV_SOURCES_PATH: &str = "JOBWATCH_SOURCES_PATH";
pub const ENV_SEEN_PATH: &str = "JOBWATCH_SEEN_PATH";
pub const ENV_METRICS_PATH: &str = "JOBWATCH_METRICS_PATH";

const PROFILE_CANDIDATES: &[&str] = &[
    "profile.yaml",
    "profile.yml",
    "profile.toml",
    "profile.json",
    "config/profile.yaml",
    "config/profile.toml",
];

const SOURCES_CANDIDATES: &[&str] = &[
    "sources.yaml",
    "sources.yml",
    "sources.toml",
    "sources.json",
    "config/sources.yaml",
    "config/sources.toml",
];

pub const DEFAULT_SEEN_PATH: &str = "seen.json";

/// Where a run reads its inputs and writes its state.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub profile_path: PathBuf,
    pub sources_path: PathBuf,
    pub seen_path: PathBuf,
    /// Prometheus textfile written at the end of a run, if set.
    pub metrics_path: Option<PathBuf>,
}

impl Settings {
    /// Resolve paths from env vars, falling back to well-known files in the CWD.
    pub fn from_env() -> Result<Self, ConfigError> {
        let profile_path = resolve_path("profile", ENV_PROFILE_PATH, PROFILE_CANDIDATES)?;
        let sources_path = resolve_path("sources", ENV_SOURCES_PATH, SOURCES_CANDIDATES)?;
        let seen_path = non_empty_env(ENV_SEEN_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SEEN_PATH));
        let metrics_path = non_empty_env(ENV_METRICS_PATH).map(PathBuf::from);

        Ok(Self {
            profile_path,
            sources_path,
            seen_path,
            metrics_path,
        })
    }

    /// Load both configuration files. Either failing is fatal.
    pub fn load(&self) -> Result<(Profile, SourcesFile), ConfigError> {
        let profile = load_profile_from(&self.profile_path)?;
        let sources = load_sources_from(&self.sources_path)?;
        Ok((profile, sources))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Locate a config file:
/// 1) `$env_var` (must exist if set)
/// 2) first existing path in `candidates`
pub fn resolve_path(
    what: &'static str,
    env_var: &str,
    candidates: &[&str],
) -> Result<PathBuf, ConfigError> {
    if let Some(p) = non_empty_env(env_var) {
        let pb = PathBuf::from(&p);
        if pb.is_file() {
            return Ok(pb);
        }
        return Err(ConfigError::Missing {
            what,
            tried: format!("${env_var}={p}"),
        });
    }

    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .ok_or_else(|| ConfigError::Missing {
            what,
            tried: candidates.join(", "),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    fn parse<T: DeserializeOwned>(self, s: &str) -> Result<T, String> {
        match self {
            Self::Yaml => serde_yaml::from_str(s).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(s).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(s).map_err(|e| e.to_string()),
        }
    }
}

pub(crate) fn read_config(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse `content` in the format implied by the extension of `path`.
/// Without a known extension YAML, JSON and TOML are tried in turn; the
/// YAML error is reported if none fits.
pub(crate) fn parse_document<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, String> {
    match Format::from_path(path) {
        Some(fmt) => fmt.parse(content),
        None => Format::Yaml.parse(content).or_else(|yaml_err| {
            Format::Json
                .parse(content)
                .or_else(|_| Format::Toml.parse(content))
                .map_err(|_| yaml_err)
        }),
    }
}
