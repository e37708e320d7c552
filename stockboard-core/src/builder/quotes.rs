//! Equity quote lists (`us-stocks.json`, `kr-stocks.json`).
//!
//! One batched request first. If it fails or comes back empty, every symbol
//! is requested on its own; if it succeeds but misses some symbols, only
//! those are requested individually. Output follows watch-list order.

use super::{DatasetReport, FetchContext};
use crate::model::StockQuote;
use crate::normalize::{normalize_quote, response_records};
use std::collections::HashMap;
use tracing::{debug, warn};

pub(super) fn build(
    ctx: &FetchContext<'_>,
    dataset: &str,
    file: &str,
    symbols: &[String],
) -> DatasetReport {
    let mut report = DatasetReport::new(dataset);
    ctx.progress.on_dataset_start(dataset, symbols.len());

    if symbols.is_empty() {
        ctx.progress.on_dataset_complete(&report);
        return report;
    }

    let mut by_symbol: HashMap<String, StockQuote> = HashMap::new();
    match ctx.request(&ctx.api.batch_quote(symbols)) {
        Ok(body) => {
            for raw in response_records(&body) {
                match normalize_quote(raw) {
                    Ok(quote) => {
                        by_symbol.entry(quote.symbol.to_ascii_uppercase()).or_insert(quote);
                    }
                    Err(e) => debug!(dataset, error = %e, "batch record dropped"),
                }
            }
            if by_symbol.is_empty() {
                warn!(dataset, "batch quote returned no records, falling back to per-symbol requests");
            }
        }
        Err(e) => {
            warn!(dataset, error = %e, "batch quote failed, falling back to per-symbol requests");
        }
    }

    let missing: Vec<String> = symbols
        .iter()
        .filter(|s| !by_symbol.contains_key(&s.to_ascii_uppercase()))
        .cloned()
        .collect();
    if !missing.is_empty() && !by_symbol.is_empty() {
        debug!(dataset, missing = missing.len(), "requesting symbols absent from batch");
    }

    let fetched = ctx.collect_each(&mut report, &missing, |symbol| {
        ctx.fetch_record(&ctx.api.quote(symbol), symbol, normalize_quote)
    });
    for quote in fetched {
        by_symbol.insert(quote.symbol.to_ascii_uppercase(), quote);
    }

    // Watch-list order; records for symbols nobody asked for are dropped.
    let quotes: Vec<StockQuote> = symbols
        .iter()
        .filter_map(|s| by_symbol.remove(&s.to_ascii_uppercase()))
        .collect();

    if !quotes.is_empty() {
        ctx.save(&mut report, file, &quotes, quotes.len());
    }

    ctx.progress.on_dataset_complete(&report);
    report
}
