use super::fields::{self as f, Record};
use super::{response_records, NormalizeError};
use crate::model::{HistoricalSeries, PricePoint};
use chrono::NaiveDate;
use serde_json::Value;

/// Normalize a daily-close response into `{symbol, historical:[{date, close}]}`.
///
/// Accepts a bare array of entries or an object wrapping them in
/// `historical`. The result is sorted ascending by date; a repeated date
/// keeps its first entry.
pub fn normalize_history(symbol: &str, response: &Value) -> Result<HistoricalSeries, NormalizeError> {
    let entries = match response {
        Value::Array(_) => response_records(response),
        Value::Object(map) => match Record::new(map).get(f::HISTORICAL) {
            Some(nested @ Value::Array(_)) => response_records(nested),
            Some(other) => {
                return Err(NormalizeError::UnexpectedShape(format!(
                    "`historical` is {}",
                    json_kind(other)
                )))
            }
            None => return Err(NormalizeError::UnexpectedShape("object without `historical`".into())),
        },
        Value::Null => return Err(NormalizeError::Empty),
        other => return Err(NormalizeError::UnexpectedShape(json_kind(other).into())),
    };

    let mut points: Vec<PricePoint> = entries
        .into_iter()
        .filter_map(|raw| {
            let rec = Record::new(raw);
            let date = parse_date(&rec.text(f::DATE))?;
            Some(PricePoint {
                date,
                close: rec.number(f::CLOSE),
            })
        })
        .collect();

    if points.is_empty() {
        return Err(NormalizeError::Empty);
    }

    // Stable sort keeps provider order among equal dates, so dedup keeps the first.
    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);

    Ok(HistoricalSeries {
        symbol: symbol.to_string(),
        historical: points,
    })
}

/// `YYYY-MM-DD`, optionally followed by a time component.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
