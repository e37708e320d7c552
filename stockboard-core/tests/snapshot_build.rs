//! End-to-end snapshot runs against an in-memory provider.
//!
//! Responses are keyed by the endpoint's display form (`path?k=v`), so the
//! same tests pin the endpoint tables as well as the builder's fallbacks.

use chrono::NaiveDate;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use stockboard_core::model::{
    CompanyProfile, HistoricalSeries, HouseTrade, InstitutionalHolding, MarketSnapshot,
    StockQuote, TradeType,
};
use stockboard_core::output::SnapshotManifest;
use stockboard_core::{
    load_json, ApiVersion, BuildError, BuilderConfig, DatasetReport, Endpoint, FetchError,
    GuruSource, LogProgress, MarketDataProvider, Pacer, ProviderError, SnapshotBuilder,
    SnapshotProgress, SnapshotWriter, Watchlist,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let text = std::fs::read_to_string(&path).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 20).unwrap()
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Canned responses; anything not registered answers HTTP 500.
#[derive(Default)]
struct MockProvider {
    responses: HashMap<String, Value>,
    calls: RefCell<Vec<String>>,
    latency: Duration,
    /// (request start, response end) per call
    spans: RefCell<Vec<(Instant, Instant)>>,
}

impl MockProvider {
    fn with(mut self, endpoint: &str, body: Value) -> Self {
        self.responses.insert(endpoint.to_string(), body);
        self
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn called(&self, endpoint: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == endpoint)
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl MarketDataProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn get(&self, endpoint: &Endpoint) -> Result<Value, ProviderError> {
        let started = Instant::now();
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        let key = endpoint.to_string();
        self.calls.borrow_mut().push(key.clone());
        let result = self
            .responses
            .get(&key)
            .cloned()
            .ok_or(ProviderError::Http {
                status: 500,
                endpoint: key,
            });
        self.spans.borrow_mut().push((started, Instant::now()));
        result
    }
}

/// Records callback order for assertions.
#[derive(Default)]
struct RecordingProgress {
    started: RefCell<Vec<(String, usize)>>,
    failed: RefCell<Vec<(String, String)>>,
    completed: RefCell<Vec<String>>,
}

impl SnapshotProgress for RecordingProgress {
    fn on_dataset_start(&self, dataset: &str, items: usize) {
        self.started.borrow_mut().push((dataset.to_string(), items));
    }

    fn on_item_failed(&self, dataset: &str, item: &str, _error: &FetchError) {
        self.failed
            .borrow_mut()
            .push((dataset.to_string(), item.to_string()));
    }

    fn on_dataset_complete(&self, report: &DatasetReport) {
        self.completed.borrow_mut().push(report.name.clone());
    }
}

fn small_watchlist() -> Watchlist {
    Watchlist {
        us: vec!["AAPL".into(), "MSFT".into()],
        kospi: vec!["005930.KS".into()],
        kosdaq: vec![],
        indexes: vec!["^GSPC".into()],
        forex: vec!["USDKRW".into()],
        commodities: vec![],
    }
}

fn config(out_dir: &Path) -> BuilderConfig {
    BuilderConfig {
        out_dir: out_dir.to_path_buf(),
        request_delay_ms: 0,
        watchlist: small_watchlist(),
        gurus: vec![
            GuruSource::Institutional {
                id: "berkshire".into(),
                cik: "0001067983".into(),
            },
            GuruSource::House {
                id: "pelosi".into(),
                name: "Nancy Pelosi".into(),
            },
            GuruSource::Institutional {
                id: "nps".into(),
                cik: "0001608046".into(),
            },
        ],
        ..BuilderConfig::default()
    }
}

/// Stable-API responses for `small_watchlist` with a few deliberate gaps:
/// the KR batch, two profiles and one history are missing, and the NPS
/// filing is empty.
fn stable_provider() -> MockProvider {
    MockProvider::default()
        .with(
            "quote?symbol=^GSPC",
            json!([{"symbol": "^GSPC", "name": "S&P 500", "price": 5917.11,
                    "changePercentage": 0.53, "change": 31.6}]),
        )
        .with(
            "quote?symbol=USDKRW",
            json!([{"symbol": "USDKRW", "name": "USD/KRW", "price": 1393.5,
                    "changesPercentage": -0.12, "change": -1.7}]),
        )
        .with("batch-quote?symbols=AAPL,MSFT", fixture("stable_batch_quote.json"))
        .with(
            "quote?symbol=MSFT",
            json!([{"symbol": "MSFT", "name": "Microsoft Corporation", "price": 415.06,
                    "changePercentage": -0.51, "change": -2.12}]),
        )
        .with(
            "quote?symbol=005930.KS",
            json!([{"symbol": "005930.KS", "name": "Samsung Electronics", "price": 55300,
                    "changePercentage": "-1.25%", "volume": null}]),
        )
        .with("profile?symbol=MSFT", fixture("legacy_profile.json"))
        .with(
            "historical-price-eod/light?symbol=AAPL&from=2023-11-20",
            fixture("legacy_historical.json"),
        )
        .with(
            "historical-price-eod/light?symbol=MSFT&from=2023-11-20",
            fixture("stable_historical.json"),
        )
        .with(
            "institutional-ownership/extract?cik=0001067983&year=2024&quarter=3",
            fixture("holdings_extract.json"),
        )
        .with(
            "house-trades-by-name?name=Nancy Pelosi",
            fixture("house_trades.json"),
        )
        .with(
            "institutional-ownership/extract?cik=0001608046&year=2024&quarter=3",
            json!([]),
        )
}

fn files_in(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

// ── Full run ─────────────────────────────────────────────────────────

#[test]
fn partial_outage_still_writes_every_dataset_with_data() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let provider = stable_provider();
    let writer = SnapshotWriter::new(dir.path());

    let summary = SnapshotBuilder::new(&cfg, &provider, &writer, &LogProgress, today())
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(summary.history_from, d("2023-11-20"));
    assert_eq!(
        files_in(dir.path()),
        vec![
            "guru-berkshire.json",
            "guru-pelosi.json",
            "historical",
            "kr-stocks.json",
            "manifest.json",
            "market-indexes.json",
            "profiles.json",
            "us-stocks.json",
        ]
    );
    assert_eq!(
        files_in(&dir.path().join("historical")),
        vec!["AAPL.json", "MSFT.json"]
    );

    let manifest: SnapshotManifest = load_json(&dir.path().join("manifest.json")).unwrap();
    assert_eq!(manifest.history_from, d("2023-11-20"));
    assert_eq!(manifest.files.len(), summary.written_files().count());
    assert!(summary.manifest.is_some());

    let nps = summary.report("guru-nps").unwrap();
    assert!(!nps.produced());
    assert_eq!(nps.failures.len(), 1);
}

#[test]
fn market_snapshot_splits_indexes_and_extras() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let provider = stable_provider();
    let writer = SnapshotWriter::new(dir.path());
    SnapshotBuilder::new(&cfg, &provider, &writer, &LogProgress, today())
        .unwrap()
        .run()
        .unwrap();

    let market: MarketSnapshot = load_json(&dir.path().join("market-indexes.json")).unwrap();
    assert_eq!(market.indexes.len(), 1);
    assert_eq!(market.indexes[0].symbol, "^GSPC");
    assert_eq!(market.indexes[0].changes_percentage, 0.53);
    assert_eq!(market.extras.len(), 1);
    assert_eq!(market.extras[0].pair, "USDKRW");
    assert_eq!(market.extras[0].rate, 1393.5);
    assert_eq!(market.extras[0].changes_percentage, -0.12);
}

#[test]
fn batch_gaps_are_filled_per_symbol_in_watchlist_order() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let provider = stable_provider();
    let writer = SnapshotWriter::new(dir.path());
    SnapshotBuilder::new(&cfg, &provider, &writer, &LogProgress, today())
        .unwrap()
        .run()
        .unwrap();

    let us: Vec<StockQuote> = load_json(&dir.path().join("us-stocks.json")).unwrap();
    let symbols: Vec<&str> = us.iter().map(|q| q.symbol.as_str()).collect();
    // NVDA came back in the batch unrequested and is dropped
    assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    assert_eq!(us[0].price, 232.8);
    assert_eq!(us[0].changes_percentage, 2.1008);
    assert_eq!(us[1].change, -2.12);

    assert!(provider.called("quote?symbol=MSFT"));
    assert!(!provider.called("quote?symbol=AAPL"));
}

#[test]
fn failed_batch_falls_back_to_single_quotes() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let provider = stable_provider();
    let writer = SnapshotWriter::new(dir.path());
    SnapshotBuilder::new(&cfg, &provider, &writer, &LogProgress, today())
        .unwrap()
        .run()
        .unwrap();

    assert!(provider.called("batch-quote?symbols=005930.KS"));
    let kr: Vec<StockQuote> = load_json(&dir.path().join("kr-stocks.json")).unwrap();
    assert_eq!(kr.len(), 1);
    assert_eq!(kr[0].symbol, "005930.KS");
    assert_eq!(kr[0].price, 55300.0);
    assert_eq!(kr[0].changes_percentage, -1.25);
    assert_eq!(kr[0].volume, 0.0);
}

#[test]
fn failed_profiles_are_omitted_from_the_map() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let provider = stable_provider();
    let writer = SnapshotWriter::new(dir.path());
    let summary = SnapshotBuilder::new(&cfg, &provider, &writer, &LogProgress, today())
        .unwrap()
        .run()
        .unwrap();

    let profiles: HashMap<String, CompanyProfile> =
        load_json(&dir.path().join("profiles.json")).unwrap();
    assert_eq!(profiles.len(), 1);
    let msft = &profiles["MSFT"];
    assert_eq!(msft.company_name, "Microsoft Corporation");
    assert_eq!(msft.quote.market_cap, 3085483920000.0);
    assert_eq!(msft.quote.year_low, 366.5);
    assert_eq!(msft.quote.year_high, 468.35);
    assert_eq!(msft.quote.avg_volume, 20021520.0);
    assert_eq!(msft.quote.volume, msft.quote.avg_volume);
    assert_eq!(msft.dividend, 3.32);
    assert_eq!(msft.sector, "Technology");

    let report = summary.report("profiles").unwrap();
    let failed: Vec<&str> = report.failures.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(failed, vec!["AAPL", "005930.KS"]);
}

#[test]
fn history_accepts_both_shapes_and_sorts_ascending() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let provider = stable_provider();
    let writer = SnapshotWriter::new(dir.path());
    SnapshotBuilder::new(&cfg, &provider, &writer, &LogProgress, today())
        .unwrap()
        .run()
        .unwrap();

    let aapl: HistoricalSeries = load_json(&dir.path().join("historical/AAPL.json")).unwrap();
    assert_eq!(aapl.symbol, "AAPL");
    let dates: Vec<NaiveDate> = aapl.historical.iter().map(|p| p.date).collect();
    assert_eq!(dates, vec![d("2024-11-15"), d("2024-11-18"), d("2024-11-19")]);
    assert_eq!(aapl.historical[0].close, 225.0);

    let msft: HistoricalSeries = load_json(&dir.path().join("historical/MSFT.json")).unwrap();
    assert_eq!(msft.historical.len(), 3, "duplicate date collapses");
    assert_eq!(msft.historical[2].close, 417.79);

    // On disk the date is a plain YYYY-MM-DD string
    let raw: Value = load_json(&dir.path().join("historical/MSFT.json")).unwrap();
    assert_eq!(raw["historical"][0]["date"], "2024-11-15");
    let entry = raw["historical"][0].as_object().unwrap();
    let mut keys: Vec<&str> = entry.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, vec!["close", "date"]);
    assert_eq!(raw.as_object().unwrap().len(), 2);
}

#[test]
fn guru_files_hold_normalized_entries() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let provider = stable_provider();
    let writer = SnapshotWriter::new(dir.path());
    SnapshotBuilder::new(&cfg, &provider, &writer, &LogProgress, today())
        .unwrap()
        .run()
        .unwrap();

    let holdings: Vec<InstitutionalHolding> =
        load_json(&dir.path().join("guru-berkshire.json")).unwrap();
    assert_eq!(holdings.len(), 2, "entry without a symbol is dropped");
    assert_eq!(holdings[0].symbol, "AAPL");
    assert!((holdings[0].weight - 75.0).abs() < 1e-9);
    assert!((holdings[1].weight - 25.0).abs() < 1e-9);

    let trades: Vec<HouseTrade> = load_json(&dir.path().join("guru-pelosi.json")).unwrap();
    assert_eq!(trades.len(), 2, "non-ticker disclosure is dropped");
    assert_eq!(trades[0].trade_type, TradeType::Purchase);
    assert_eq!(trades[1].trade_type, TradeType::SalePartial);
    assert_eq!(trades[1].amount, "$250,001 - $500,000");

    assert!(!dir.path().join("guru-nps.json").exists());
}

#[test]
fn progress_sees_every_dataset_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let provider = stable_provider();
    let writer = SnapshotWriter::new(dir.path());
    let progress = RecordingProgress::default();
    SnapshotBuilder::new(&cfg, &provider, &writer, &progress, today())
        .unwrap()
        .run()
        .unwrap();

    let expected = vec![
        "market-indexes",
        "us-stocks",
        "kr-stocks",
        "profiles",
        "historical",
        "guru-berkshire",
        "guru-pelosi",
        "guru-nps",
    ];
    assert_eq!(*progress.completed.borrow(), expected);
    assert_eq!(progress.started.borrow()[0], ("market-indexes".to_string(), 2));
    assert!(progress
        .failed
        .borrow()
        .contains(&("historical".to_string(), "005930.KS".to_string())));
}

// ── Failure modes ────────────────────────────────────────────────────

#[test]
fn total_outage_is_no_data_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("data");
    let cfg = config(&out);
    let provider = MockProvider::default();
    let writer = SnapshotWriter::new(&out);

    let err = SnapshotBuilder::new(&cfg, &provider, &writer, &LogProgress, today())
        .unwrap()
        .run()
        .unwrap_err();

    assert!(matches!(err, BuildError::NoData { datasets: 8 }));
    assert!(files_in(&out).is_empty());
}

#[test]
fn failed_dataset_keeps_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let previous = "[{\"symbol\": \"OLD\"}]\n";
    std::fs::write(dir.path().join("us-stocks.json"), previous).unwrap();

    let mut cfg = config(dir.path());
    cfg.gurus.clear();
    // Only the market snapshot answers
    let provider = MockProvider::default().with(
        "quote?symbol=^GSPC",
        json!([{"symbol": "^GSPC", "price": 5917.11}]),
    );
    let writer = SnapshotWriter::new(dir.path());
    let summary = SnapshotBuilder::new(&cfg, &provider, &writer, &LogProgress, today())
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(summary.produced_count(), 1);
    let kept = std::fs::read_to_string(dir.path().join("us-stocks.json")).unwrap();
    assert_eq!(kept, previous);
    assert!(!dir.path().join("profiles.json").exists());
}

#[test]
fn invalid_config_is_rejected_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.history_months = 0;
    let provider = stable_provider();
    let writer = SnapshotWriter::new(dir.path());

    let result = SnapshotBuilder::new(&cfg, &provider, &writer, &LogProgress, today());
    assert!(matches!(result, Err(BuildError::Config(_))));
    assert_eq!(provider.call_count(), 0);
}

// ── API versions and pacing ──────────────────────────────────────────

#[test]
fn legacy_endpoints_and_newest_alias_wins() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = BuilderConfig {
        api_version: ApiVersion::Legacy,
        out_dir: dir.path().to_path_buf(),
        request_delay_ms: 0,
        watchlist: Watchlist {
            us: vec!["AAPL".into()],
            kospi: vec![],
            kosdaq: vec![],
            indexes: vec![],
            forex: vec![],
            commodities: vec![],
        },
        gurus: vec![],
        ..BuilderConfig::default()
    };
    let provider = MockProvider::default()
        .with(
            "v3/quote/AAPL",
            json!([{"symbol": "AAPL", "name": "Apple Inc.", "price": "232.80",
                    "changePercentage": 1.5, "changesPercentage": 9.9,
                    "avgVolume": 50_000_000, "exchange": "NASDAQ"}]),
        )
        .with(
            "v3/historical-price-full/AAPL?from=2023-11-20",
            fixture("legacy_historical.json"),
        );
    let writer = SnapshotWriter::new(dir.path());
    let summary = SnapshotBuilder::new(&cfg, &provider, &writer, &LogProgress, today())
        .unwrap()
        .run()
        .unwrap();

    let us: Vec<StockQuote> = load_json(&dir.path().join("us-stocks.json")).unwrap();
    assert_eq!(us[0].price, 232.8);
    assert_eq!(us[0].changes_percentage, 1.5);
    assert_eq!(us[0].avg_volume, 50_000_000.0);
    assert!(dir.path().join("historical/AAPL.json").exists());
    assert!(provider.called("v3/profile/AAPL"));
    assert!(!summary.report("profiles").unwrap().produced());
}

#[test]
fn requests_are_paced() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let provider = stable_provider();
    let writer = SnapshotWriter::new(dir.path());
    let interval = Duration::from_millis(10);

    let start = Instant::now();
    SnapshotBuilder::new(&cfg, &provider, &writer, &LogProgress, today())
        .unwrap()
        .with_pacer(Pacer::new(interval))
        .run()
        .unwrap();
    let elapsed = start.elapsed();

    let calls = provider.call_count() as u32;
    assert!(calls > 1);
    assert!(elapsed >= interval * (calls - 1));
}

#[test]
fn pause_follows_slow_responses() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.gurus.clear();
    // Responses take longer than the pacing interval
    let provider = stable_provider().with_latency(Duration::from_millis(25));
    let writer = SnapshotWriter::new(dir.path());
    let interval = Duration::from_millis(15);

    SnapshotBuilder::new(&cfg, &provider, &writer, &LogProgress, today())
        .unwrap()
        .with_pacer(Pacer::new(interval))
        .run()
        .unwrap();

    let spans = provider.spans.borrow();
    assert!(spans.len() > 1);
    for pair in spans.windows(2) {
        let idle = pair[1].0.duration_since(pair[0].1);
        assert!(idle >= interval, "idle gap {idle:?} shorter than {interval:?}");
    }
}
