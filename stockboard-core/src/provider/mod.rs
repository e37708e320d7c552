//! Market-data provider trait and structured error types.
//!
//! The `MarketDataProvider` trait abstracts over the HTTP API so the snapshot
//! builder can be driven by an in-memory provider in tests. Providers return
//! raw JSON; reshaping happens in `normalize`.

mod endpoints;
mod fmp;
mod pacer;

pub use endpoints::{ApiVersion, ReportPeriod};
pub use fmp::FmpClient;
pub use pacer::Pacer;

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Structured error types for provider requests.
///
/// None of these are retried; the builder decides what a failure means for
/// its dataset.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request rejected, check the API key or plan ({0})")]
    Unauthorized(String),

    #[error("rate limited by provider (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("HTTP {status} for {endpoint}")]
    Http { status: u16, endpoint: String },

    #[error("invalid JSON from {endpoint}: {reason}")]
    InvalidJson { endpoint: String, reason: String },

    #[error("provider error: {0}")]
    Upstream(String),

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// One provider request: a path relative to the API base plus query pairs.
///
/// The API key is appended by the client and is never part of an `Endpoint`,
/// so endpoints are safe to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (k, v)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{k}={v}")?;
        }
        Ok(())
    }
}

/// Trait for market-data providers.
///
/// Implementations issue exactly one request per call. Pacing between calls
/// is the caller's job.
pub trait MarketDataProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch one endpoint and return its JSON body.
    fn get(&self, endpoint: &Endpoint) -> Result<Value, ProviderError>;
}
