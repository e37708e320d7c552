//! `market-indexes.json`: indexes plus forex/commodity extras, one request per symbol.

use super::{DatasetReport, FetchContext};
use crate::model::MarketSnapshot;
use crate::normalize::{normalize_exchange_rate, normalize_index};
use crate::output::MARKET_INDEXES_FILE;
use crate::watchlist::Watchlist;

pub(super) const DATASET: &str = "market-indexes";

pub(super) fn build(ctx: &FetchContext<'_>, watchlist: &Watchlist) -> DatasetReport {
    let mut report = DatasetReport::new(DATASET);
    let extras = watchlist.extras();
    ctx.progress
        .on_dataset_start(DATASET, watchlist.indexes.len() + extras.len());

    let indexes = ctx.collect_each(&mut report, &watchlist.indexes, |symbol| {
        ctx.fetch_record(&ctx.api.quote(symbol), symbol, normalize_index)
    });
    let extras = ctx.collect_each(&mut report, &extras, |symbol| {
        ctx.fetch_record(&ctx.api.quote(symbol), symbol, normalize_exchange_rate)
    });

    let snapshot = MarketSnapshot { indexes, extras };
    if !snapshot.is_empty() {
        ctx.save(&mut report, MARKET_INDEXES_FILE, &snapshot, snapshot.len());
    }

    ctx.progress.on_dataset_complete(&report);
    report
}
