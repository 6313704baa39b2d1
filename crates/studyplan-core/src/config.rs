//! `studyplan.toml` configuration
//!
//! ```toml
//! [solver]
//! time_limit_ms = 4000
//! backend = "search"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 5001
//! ```
//!
//! Every key is optional.

use crate::model::SolveLimits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration loading error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Solver backend '{0}' is not available in this build")]
    BackendUnavailable(SolverBackend),
}

/// Which [`crate::CpSolver`] implementation to use
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverBackend {
    /// Built-in branch-and-bound search
    #[default]
    Search,
    /// Pumpkin constraint solver (cargo feature `pumpkin`)
    Pumpkin,
}

impl std::fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverBackend::Search => f.write_str("search"),
            SolverBackend::Pumpkin => f.write_str("pumpkin"),
        }
    }
}

impl std::str::FromStr for SolverBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "search" => Ok(SolverBackend::Search),
            "pumpkin" => Ok(SolverBackend::Pumpkin),
            other => Err(format!("unknown solver backend '{}'", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSection {
    /// Wall-clock budget per solve, in milliseconds
    pub time_limit_ms: u64,
    pub backend: SolverBackend,
}

impl Default for SolverSection {
    fn default() -> Self {
        Self {
            time_limit_ms: SolveLimits::DEFAULT_TIME_LIMIT.as_millis() as u64,
            backend: SolverBackend::default(),
        }
    }
}

impl SolverSection {
    pub fn limits(&self) -> SolveLimits {
        SolveLimits::new(Duration::from_millis(self.time_limit_ms))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5001,
        }
    }
}

/// Whole configuration file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub solver: SolverSection,
    pub server: ServerSection,
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Load a config file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map(Self::load).unwrap_or_else(|| Ok(Self::default()))
    }
}
