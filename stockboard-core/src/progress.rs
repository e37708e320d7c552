//! Progress callbacks for snapshot runs.

use crate::builder::{DatasetReport, FetchError};
use tracing::{info, warn};

/// Progress callback for dataset fetch loops.
pub trait SnapshotProgress {
    /// Called when a dataset starts, with the number of items it will request.
    fn on_dataset_start(&self, dataset: &str, items: usize);

    /// Called when one item (symbol, guru) fails and is skipped.
    fn on_item_failed(&self, dataset: &str, item: &str, error: &FetchError);

    /// Called when a dataset is finished, whether or not anything was written.
    fn on_dataset_complete(&self, report: &DatasetReport);
}

/// Forwards progress to `tracing`.
pub struct LogProgress;

impl SnapshotProgress for LogProgress {
    fn on_dataset_start(&self, dataset: &str, items: usize) {
        info!(dataset, items, "fetching");
    }

    fn on_item_failed(&self, dataset: &str, item: &str, error: &FetchError) {
        warn!(dataset, item, %error, "skipped");
    }

    fn on_dataset_complete(&self, report: &DatasetReport) {
        match report.written.as_slice() {
            [] => warn!(
                dataset = %report.name,
                failed = report.failures.len(),
                "no data, dataset not written"
            ),
            files => info!(
                dataset = %report.name,
                files = files.len(),
                records = report.records(),
                failed = report.failures.len(),
                "saved"
            ),
        }
    }
}
