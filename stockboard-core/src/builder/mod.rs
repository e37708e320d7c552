//! Snapshot builder — runs every dataset fetch in sequence and writes the results.
//!
//! Failures are contained at the narrowest scope: a failed symbol is skipped
//! within its dataset, a failed dataset is left unwritten, and the run only
//! fails when no dataset produced anything.

mod guru;
mod historical;
mod market;
mod profiles;
mod quotes;

use crate::config::{BuilderConfig, ConfigError, GuruSource};
use crate::normalize::fields::{self, Record};
use crate::normalize::{response_records, NormalizeError};
use crate::output::{SnapshotManifest, SnapshotWriter, WrittenFile};
use crate::progress::SnapshotProgress;
use crate::provider::{ApiVersion, Endpoint, MarketDataProvider, Pacer, ProviderError};
use crate::watchlist::Watchlist;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

/// Why one symbol or guru could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("{symbol} not present in response")]
    NotInResponse { symbol: String },
}

/// Run-level failures.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no dataset produced any data ({datasets} attempted)")]
    NoData { datasets: usize },
}

/// Outcome of one dataset.
#[derive(Debug, Clone, Default)]
pub struct DatasetReport {
    pub name: String,
    pub written: Vec<WrittenFile>,
    /// (item, reason) for every skipped symbol, guru or file.
    pub failures: Vec<(String, String)>,
}

impl DatasetReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn produced(&self) -> bool {
        !self.written.is_empty()
    }

    pub fn records(&self) -> usize {
        self.written.iter().map(|w| w.records).sum()
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub history_from: NaiveDate,
    pub reports: Vec<DatasetReport>,
    pub manifest: Option<WrittenFile>,
}

impl RunSummary {
    pub fn any_produced(&self) -> bool {
        self.reports.iter().any(DatasetReport::produced)
    }

    pub fn produced_count(&self) -> usize {
        self.reports.iter().filter(|r| r.produced()).count()
    }

    pub fn report(&self, name: &str) -> Option<&DatasetReport> {
        self.reports.iter().find(|r| r.name == name)
    }

    pub fn written_files(&self) -> impl Iterator<Item = &WrittenFile> {
        self.reports.iter().flat_map(|r| r.written.iter())
    }
}

/// Shared request plumbing for the dataset fetchers.
pub(crate) struct FetchContext<'a> {
    provider: &'a dyn MarketDataProvider,
    progress: &'a dyn SnapshotProgress,
    writer: &'a SnapshotWriter,
    pacer: &'a Pacer,
    api: ApiVersion,
}

impl FetchContext<'_> {
    /// One paced provider request.
    fn request(&self, endpoint: &Endpoint) -> Result<Value, ProviderError> {
        self.pacer.wait();
        let result = self.provider.get(endpoint);
        self.pacer.done();
        result
    }

    /// Request a single-symbol endpoint and normalize the record for `symbol`.
    fn fetch_record<T>(
        &self,
        endpoint: &Endpoint,
        symbol: &str,
        normalize: fn(&Map<String, Value>) -> Result<T, NormalizeError>,
    ) -> Result<T, FetchError> {
        let body = self.request(endpoint)?;
        let raw = pick_record(&body, symbol)?;
        Ok(normalize(raw)?)
    }

    /// Run `fetch` for every item, keeping successes in order and recording
    /// failures. No state carries over from a failed item to the next.
    fn collect_each<T>(
        &self,
        report: &mut DatasetReport,
        items: &[String],
        mut fetch: impl FnMut(&str) -> Result<T, FetchError>,
    ) -> Vec<T> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match fetch(item) {
                Ok(value) => out.push(value),
                Err(e) => self.fail(report, item, e),
            }
        }
        out
    }

    fn fail(&self, report: &mut DatasetReport, item: &str, error: FetchError) {
        self.progress.on_item_failed(&report.name, item, &error);
        report.failures.push((item.to_string(), error.to_string()));
    }

    /// Write one file for the dataset; a write error is recorded, not raised.
    fn save<T: Serialize + ?Sized>(
        &self,
        report: &mut DatasetReport,
        relative: &str,
        value: &T,
        records: usize,
    ) {
        match self.writer.write_json(relative, value, records) {
            Ok(written) => report.written.push(written),
            Err(e) => {
                error!(dataset = %report.name, file = relative, error = %e, "write failed");
                report.failures.push((relative.to_string(), format!("write failed: {e}")));
            }
        }
    }
}

/// The record for `symbol` in a single-symbol response, matched
/// case-insensitively.
fn pick_record<'v>(body: &'v Value, symbol: &str) -> Result<&'v Map<String, Value>, FetchError> {
    let records = response_records(body);
    if records.is_empty() {
        return Err(NormalizeError::Empty.into());
    }
    records
        .into_iter()
        .find(|raw| {
            Record::new(raw)
                .text(fields::SYMBOL)
                .eq_ignore_ascii_case(symbol)
        })
        .ok_or_else(|| FetchError::NotInResponse {
            symbol: symbol.to_string(),
        })
}

/// Orchestrates one snapshot run.
pub struct SnapshotBuilder<'a> {
    provider: &'a dyn MarketDataProvider,
    writer: &'a SnapshotWriter,
    progress: &'a dyn SnapshotProgress,
    pacer: Pacer,
    api: ApiVersion,
    watchlist: Watchlist,
    gurus: Vec<GuruSource>,
    today: NaiveDate,
    history_from: NaiveDate,
}

impl<'a> SnapshotBuilder<'a> {
    /// `today` is the run date; the history cutoff is derived from it once.
    pub fn new(
        config: &BuilderConfig,
        provider: &'a dyn MarketDataProvider,
        writer: &'a SnapshotWriter,
        progress: &'a dyn SnapshotProgress,
        today: NaiveDate,
    ) -> Result<Self, BuildError> {
        config.validate()?;
        Ok(Self {
            provider,
            writer,
            progress,
            pacer: Pacer::new(config.request_delay()),
            api: config.api_version,
            watchlist: config.watchlist.clone().cleaned(),
            gurus: config.gurus.clone(),
            today,
            history_from: config.history_start(today),
        })
    }

    /// Replace the pacer built from `request_delay_ms`.
    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn history_from(&self) -> NaiveDate {
        self.history_from
    }

    /// Fetch and write every dataset.
    ///
    /// Returns `BuildError::NoData` if nothing at all was written; any partial
    /// result is `Ok`.
    pub fn run(&self) -> Result<RunSummary, BuildError> {
        info!(
            provider = self.provider.name(),
            from = %self.history_from,
            symbols = self.watchlist.symbol_count(),
            gurus = self.gurus.len(),
            "snapshot run started"
        );

        let ctx = FetchContext {
            provider: self.provider,
            progress: self.progress,
            writer: self.writer,
            pacer: &self.pacer,
            api: self.api,
        };

        let mut reports = vec![
            market::build(&ctx, &self.watchlist),
            quotes::build(&ctx, "us-stocks", crate::output::US_STOCKS_FILE, &self.watchlist.us),
            quotes::build(
                &ctx,
                "kr-stocks",
                crate::output::KR_STOCKS_FILE,
                &self.watchlist.korean(),
            ),
            profiles::build(&ctx, &self.watchlist.equities()),
            historical::build(&ctx, &self.watchlist.equities(), self.history_from),
        ];
        for source in &self.gurus {
            reports.push(guru::build(&ctx, source, self.today));
        }

        let mut summary = RunSummary {
            history_from: self.history_from,
            reports,
            manifest: None,
        };

        if !summary.any_produced() {
            return Err(BuildError::NoData {
                datasets: summary.reports.len(),
            });
        }

        let manifest = SnapshotManifest {
            generated_at: chrono::Utc::now().naive_utc(),
            history_from: self.history_from,
            files: summary.written_files().cloned().collect(),
        };
        match self.writer.write_manifest(&manifest) {
            Ok(written) => summary.manifest = Some(written),
            Err(e) => warn!(error = %e, "manifest not written"),
        }

        info!(
            produced = summary.produced_count(),
            datasets = summary.reports.len(),
            "snapshot run finished"
        );
        Ok(summary)
    }
}
