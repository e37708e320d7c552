//! Builder configuration.
//!
//! Everything except the API key comes from an optional TOML file whose keys
//! all have defaults, so a bare `stockboard` run works with only
//! `FMP_API_KEY` set. The key is read from the environment only.

use crate::provider::ApiVersion;
use crate::watchlist::Watchlist;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the provider API key.
pub const API_KEY_VAR: &str = "FMP_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} environment variable is required")]
    MissingApiKey { var: &'static str },

    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A "guru" whose disclosed positions get their own `guru-<id>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuruSource {
    /// Institutional investor, identified by SEC CIK; 13F holdings.
    Institutional { id: String, cik: String },
    /// House member, identified by name; periodic transaction reports.
    House { id: String, name: String },
}

impl GuruSource {
    pub fn id(&self) -> &str {
        match self {
            GuruSource::Institutional { id, .. } | GuruSource::House { id, .. } => id,
        }
    }

    /// Output file name, e.g. `guru-berkshire.json`.
    pub fn file_name(&self) -> String {
        format!("guru-{}.json", self.id())
    }
}

/// Serializable builder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub api_version: ApiVersion,
    /// Overrides the version's default base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub out_dir: PathBuf,
    /// Idle time between one provider response and the next request.
    pub request_delay_ms: u64,
    /// History window, counted back from the run date.
    pub history_months: u32,
    pub timeout_secs: u64,
    pub watchlist: Watchlist,
    pub gurus: Vec<GuruSource>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            api_version: ApiVersion::default(),
            base_url: None,
            out_dir: PathBuf::from("public/data"),
            request_delay_ms: 300,
            history_months: 12,
            timeout_secs: 30,
            watchlist: Watchlist::default(),
            gurus: vec![
                GuruSource::Institutional {
                    id: "berkshire".into(),
                    cik: "0001067983".into(),
                },
                GuruSource::Institutional {
                    id: "nps".into(),
                    cik: "0001608046".into(),
                },
                GuruSource::House {
                    id: "pelosi".into(),
                    name: "Nancy Pelosi".into(),
                },
            ],
        }
    }
}

impl BuilderConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.watchlist = config.watchlist.cleaned();
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_months == 0 {
            return Err(ConfigError::Invalid("history_months must be at least 1".into()));
        }

        let mut ids = HashSet::new();
        for guru in &self.gurus {
            let id = guru.id();
            if id.trim().is_empty() {
                return Err(ConfigError::Invalid("guru id must not be empty".into()));
            }
            if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
                return Err(ConfigError::Invalid(format!(
                    "guru id '{id}' must be ASCII letters, digits, '-' or '_'"
                )));
            }
            if !ids.insert(id) {
                return Err(ConfigError::Invalid(format!("duplicate guru id '{id}'")));
            }
            let (field, value) = match guru {
                GuruSource::Institutional { cik, .. } => ("cik", cik),
                GuruSource::House { name, .. } => ("name", name),
            };
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("guru '{id}' has an empty {field}")));
            }
        }
        Ok(())
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Earliest date requested for historical closes.
    pub fn history_start(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_months(Months::new(self.history_months))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// Provider credential, kept out of the serializable config.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Resolve the key through `lookup`, treating blank values as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        lookup(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .map(|api_key| Self { api_key })
            .ok_or(ConfigError::MissingApiKey { var: API_KEY_VAR })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("api_key", &"<redacted>").finish()
    }
}
