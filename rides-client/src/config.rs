//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use tracing_subscriber::filter::Directive;

/// Logging output format
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Logging {
    /// Additional filtering directives
    #[serde(default, deserialize_with = "Logging::deserialize_filters")]
    pub filters: Vec<Directive>,

    /// Logging format
    #[serde(default)]
    pub format: LogFormat,
}

impl Logging {
    fn deserialize_filters<'de, D>(deserializer: D) -> Result<Vec<Directive>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dirs: Vec<String> = Deserialize::deserialize(deserializer)?;
        dirs.into_iter()
            .map(|dir| dir.parse().map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Remote API access
#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    /// Base URL all the endpoints are relative to
    #[serde(default = "Api::default_base_url")]
    pub base_url: String,

    /// Per-request timeout. Requests never time out if not set.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Api {
    fn default_base_url() -> String {
        "http://127.0.0.1:8000".to_owned()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_secs: None,
        }
    }
}

/// Persisted session location
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    #[serde(default = "Session::default_path")]
    pub path: PathBuf,
}

impl Session {
    fn default_path() -> PathBuf {
        "session.toml".into()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

/// Top level client configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// API configuration
    #[serde(default)]
    pub api: Api,

    /// Session storage
    #[serde(default)]
    pub session: Session,

    /// Logging configuration
    #[serde(default)]
    pub logging: Logging,
}
