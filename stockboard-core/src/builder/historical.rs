//! `historical/<SYMBOL>.json`: trailing daily closes, one request and one
//! file per symbol.

use super::{DatasetReport, FetchContext};
use crate::normalize::normalize_history;
use crate::output::SnapshotWriter;
use chrono::NaiveDate;

pub(super) const DATASET: &str = "historical";

pub(super) fn build(ctx: &FetchContext<'_>, symbols: &[String], from: NaiveDate) -> DatasetReport {
    let mut report = DatasetReport::new(DATASET);
    ctx.progress.on_dataset_start(DATASET, symbols.len());

    let series = ctx.collect_each(&mut report, symbols, |symbol| {
        let body = ctx.request(&ctx.api.historical(symbol, from))?;
        Ok(normalize_history(symbol, &body)?)
    });

    for s in &series {
        ctx.save(
            &mut report,
            &SnapshotWriter::historical_path(&s.symbol),
            s,
            s.historical.len(),
        );
    }

    ctx.progress.on_dataset_complete(&report);
    report
}
