//! Stockboard Core — snapshot builder for the market dashboard.
//!
//! This crate turns a market-data provider's shifting response shapes into
//! the stable JSON files the dashboard front end reads:
//! - Provider boundary (endpoint tables per API version, HTTP client, pacing)
//! - Field reconciliation (alias tables, numeric coercion, response shapes)
//! - Record model (quotes, profiles, indexes, history, 13F holdings, house trades)
//! - Dataset fetchers with per-symbol and per-dataset failure isolation
//! - Atomic pretty-printed JSON writer with a content-hashed manifest

pub mod builder;
pub mod config;
pub mod model;
pub mod normalize;
pub mod output;
pub mod progress;
pub mod provider;
pub mod watchlist;

pub use builder::{BuildError, DatasetReport, FetchError, RunSummary, SnapshotBuilder};
pub use config::{BuilderConfig, ConfigError, Credentials, GuruSource};
pub use output::{load_json, SnapshotWriter, WriteError};
pub use progress::{LogProgress, SnapshotProgress};
pub use provider::{ApiVersion, Endpoint, FmpClient, MarketDataProvider, Pacer, ProviderError};
pub use watchlist::Watchlist;
