//! Reconciliation of provider responses into snapshot records.
//!
//! Normalizers take raw `serde_json::Value` responses, so a renamed or
//! retyped field never fails a whole response. Only structural problems
//! (no symbol, no usable entries) are errors.

pub mod fields;
mod guru;
mod history;
mod quote;

pub use guru::{normalize_holdings, normalize_house_trades};
pub use history::normalize_history;
pub use quote::{normalize_exchange_rate, normalize_index, normalize_profile, normalize_quote};

use serde_json::{Map, Value};
use thiserror::Error;

/// Structural problems with a provider response.
#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("record has no symbol")]
    MissingSymbol,

    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    #[error("response contained no usable records")]
    Empty,
}

/// Flatten a response into its object records.
///
/// The provider answers with a bare array, a single object, or `null`
/// depending on endpoint and version. Non-object array elements are ignored.
pub fn response_records(value: &Value) -> Vec<&Map<String, Value>> {
    match value {
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        Value::Object(map) => vec![map],
        _ => Vec::new(),
    }
}
