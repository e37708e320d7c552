//! `guru-<id>.json`: 13F holdings or House trades, one request per guru.
//! An empty or failed response skips the file.

use super::{DatasetReport, FetchContext, FetchError};
use crate::config::GuruSource;
use crate::normalize::{normalize_holdings, normalize_house_trades, NormalizeError};
use crate::provider::ReportPeriod;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

pub(super) fn build(ctx: &FetchContext<'_>, source: &GuruSource, today: NaiveDate) -> DatasetReport {
    let file = source.file_name();
    let dataset = file.trim_end_matches(".json");
    let mut report = DatasetReport::new(dataset);
    ctx.progress.on_dataset_start(dataset, 1);

    match source {
        GuruSource::Institutional { id, cik } => {
            let period = ReportPeriod::latest_filed(today);
            debug!(guru = %id, cik = %cik, year = period.year, quarter = period.quarter, "requesting 13F holdings");
            let holdings = ctx
                .request(&ctx.api.institutional_holdings(cik, period))
                .map(|body| normalize_holdings(&body))
                .map_err(FetchError::from);
            save_nonempty(ctx, &mut report, id, &file, holdings);
        }
        GuruSource::House { id, name } => {
            let trades = ctx
                .request(&ctx.api.house_trades(name))
                .map(|body| normalize_house_trades(&body))
                .map_err(FetchError::from);
            save_nonempty(ctx, &mut report, id, &file, trades);
        }
    }

    ctx.progress.on_dataset_complete(&report);
    report
}

fn save_nonempty<T: Serialize>(
    ctx: &FetchContext<'_>,
    report: &mut DatasetReport,
    id: &str,
    file: &str,
    result: Result<Vec<T>, FetchError>,
) {
    match result {
        Ok(entries) if entries.is_empty() => ctx.fail(report, id, NormalizeError::Empty.into()),
        Ok(entries) => ctx.save(report, file, &entries, entries.len()),
        Err(e) => ctx.fail(report, id, e),
    }
}
