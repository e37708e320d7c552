//! `profiles.json`: symbol → company profile, one request per symbol.
//! Failed symbols are left out of the map entirely.

use super::{DatasetReport, FetchContext};
use crate::model::ProfileMap;
use crate::normalize::normalize_profile;
use crate::output::PROFILES_FILE;

pub(super) const DATASET: &str = "profiles";

pub(super) fn build(ctx: &FetchContext<'_>, symbols: &[String]) -> DatasetReport {
    let mut report = DatasetReport::new(DATASET);
    ctx.progress.on_dataset_start(DATASET, symbols.len());

    let profiles: ProfileMap = ctx
        .collect_each(&mut report, symbols, |symbol| {
            ctx.fetch_record(&ctx.api.profile(symbol), symbol, normalize_profile)
        })
        .into_iter()
        .map(|p| (p.quote.symbol.clone(), p))
        .collect();

    if !profiles.is_empty() {
        ctx.save(&mut report, PROFILES_FILE, &profiles, profiles.len());
    }

    ctx.progress.on_dataset_complete(&report);
    report
}
