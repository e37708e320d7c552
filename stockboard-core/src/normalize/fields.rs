//! Field alias table and value coercion.
//!
//! The provider has renamed fields between API versions. Each canonical field
//! maps to its upstream names, newest first; the first alias that is present
//! and non-null supplies the value. Supporting a new API version means adding
//! an alias here.

use serde_json::{Map, Value};

pub const SYMBOL: &[&str] = &["symbol", "ticker"];
pub const NAME: &[&str] = &["name", "companyName"];
pub const COMPANY_NAME: &[&str] = &["companyName", "name"];
pub const PRICE: &[&str] = &["price"];
pub const CHANGE: &[&str] = &["change", "changes"];
pub const CHANGES_PERCENTAGE: &[&str] = &["changePercentage", "changesPercentage"];
pub const DAY_LOW: &[&str] = &["dayLow"];
pub const DAY_HIGH: &[&str] = &["dayHigh"];
pub const YEAR_HIGH: &[&str] = &["yearHigh"];
pub const YEAR_LOW: &[&str] = &["yearLow"];
pub const PRICE_RANGE: &[&str] = &["range"];
pub const MARKET_CAP: &[&str] = &["marketCap", "mktCap"];
pub const PRICE_AVG_50: &[&str] = &["priceAvg50"];
pub const PRICE_AVG_200: &[&str] = &["priceAvg200"];
pub const VOLUME: &[&str] = &["volume"];
pub const AVG_VOLUME: &[&str] = &["averageVolume", "avgVolume", "volAvg"];
pub const EXCHANGE: &[&str] = &["exchange", "exchangeShortName"];
pub const OPEN: &[&str] = &["open"];
pub const PREVIOUS_CLOSE: &[&str] = &["previousClose"];
pub const EPS: &[&str] = &["eps"];
pub const PE: &[&str] = &["pe", "peRatio"];
pub const SHARES_OUTSTANDING: &[&str] = &["sharesOutstanding"];
pub const TIMESTAMP: &[&str] = &["timestamp"];

pub const SECTOR: &[&str] = &["sector"];
pub const INDUSTRY: &[&str] = &["industry"];
pub const CEO: &[&str] = &["ceo"];
pub const DESCRIPTION: &[&str] = &["description"];
pub const WEBSITE: &[&str] = &["website"];
pub const IMAGE: &[&str] = &["image", "logo"];
pub const PRICE_TO_BOOK: &[&str] = &["priceToBook", "pb"];
pub const DIVIDEND: &[&str] = &["lastDividend", "lastDiv"];

pub const DATE: &[&str] = &["date"];
pub const CLOSE: &[&str] = &["close", "price", "adjClose"];
pub const HISTORICAL: &[&str] = &["historical"];

pub const FILING_DATE: &[&str] = &["filingDate", "acceptedDate"];
pub const CIK: &[&str] = &["cik", "investorCik"];
pub const NAME_OF_ISSUER: &[&str] = &["nameOfIssuer", "securityName"];
pub const SHARES: &[&str] = &["shares", "sharesNumber"];
pub const SHARES_NUMBER: &[&str] = &["sharesNumber", "shares"];
pub const TITLE_OF_CLASS: &[&str] = &["titleOfClass"];
pub const VALUE: &[&str] = &["value", "marketValue"];
pub const WEIGHT: &[&str] = &["weight"];
pub const LAST_WEIGHT: &[&str] = &["lastWeight"];
pub const CHANGE_IN_WEIGHT: &[&str] = &["changeInWeight"];
pub const CHANGE_IN_WEIGHT_PERCENTAGE: &[&str] = &["changeInWeightPercentage"];
pub const LAST_SHARES_NUMBER: &[&str] = &["lastSharesNumber"];
pub const CHANGE_IN_SHARES_NUMBER: &[&str] = &["changeInSharesNumber"];
pub const CHANGE_IN_SHARES_NUMBER_PERCENTAGE: &[&str] = &["changeInSharesNumberPercentage"];
pub const IS_NEW: &[&str] = &["isNew"];
pub const IS_SOLD_OUT: &[&str] = &["isSoldOut"];

pub const DISCLOSURE_DATE: &[&str] = &["disclosureDate", "dateRecieved", "dateReceived"];
pub const TRANSACTION_DATE: &[&str] = &["transactionDate"];
pub const FIRST_NAME: &[&str] = &["firstName"];
pub const LAST_NAME: &[&str] = &["lastName"];
pub const OFFICE: &[&str] = &["office", "representative"];
pub const OWNER: &[&str] = &["owner"];
pub const TRADE_TYPE: &[&str] = &["type", "transactionType"];
pub const AMOUNT: &[&str] = &["amount"];
pub const LINK: &[&str] = &["link", "ptrLink"];

/// Read-only view over one upstream JSON object.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> Record<'a> {
    pub fn new(fields: &'a Map<String, Value>) -> Self {
        Self { fields }
    }

    /// First alias that is present and not `null`.
    pub fn get(&self, aliases: &[&str]) -> Option<&'a Value> {
        aliases
            .iter()
            .filter_map(|alias| self.fields.get(*alias))
            .find(|v| !v.is_null())
    }

    /// Whether any alias is present and not `null`.
    pub fn has(&self, aliases: &[&str]) -> bool {
        self.get(aliases).is_some()
    }

    pub fn number(&self, aliases: &[&str]) -> f64 {
        self.get(aliases).map(coerce_f64).unwrap_or(0.0)
    }

    pub fn integer(&self, aliases: &[&str]) -> i64 {
        // Saturating cast; NaN cannot reach here.
        self.number(aliases) as i64
    }

    pub fn text(&self, aliases: &[&str]) -> String {
        self.get(aliases).map(coerce_text).unwrap_or_default()
    }

    pub fn flag(&self, aliases: &[&str]) -> Option<bool> {
        self.get(aliases).and_then(coerce_bool)
    }
}

/// Coerce a JSON value to a finite float, falling back to `0.0`.
///
/// Strings such as `"1.23"`, `"+1.23%"`, `"(-0.5%)"` and `"1,234.5"` parse;
/// anything else is `0.0`.
pub fn coerce_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number_text(s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn parse_number_text(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '%' | '+' | '(' | ')' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Parse a `"low-high"` price range such as `"164.08-199.62"` or `"-1.5--0.2"`.
pub fn parse_range(raw: &str) -> Option<(f64, f64)> {
    let raw = raw.trim();
    // Split on the first '-' that follows a digit, so leading signs survive.
    let split = raw.char_indices().find_map(|(i, c)| {
        let follows_digit = raw[..i].trim_end().ends_with(|p: char| p.is_ascii_digit());
        (c == '-' && follows_digit).then_some(i)
    })?;
    let low = parse_number_text(&raw[..split])?;
    let high = parse_number_text(&raw[split + 1..])?;
    if low.is_finite() && high.is_finite() {
        Some((low, high))
    } else {
        None
    }
}
