use super::fields::{self as f, Record};
use super::NormalizeError;
use crate::model::{CompanyProfile, ExchangeRate, MarketIndex, StockQuote};
use serde_json::{Map, Value};

fn symbol_of(rec: &Record<'_>) -> Result<String, NormalizeError> {
    let symbol = rec.text(f::SYMBOL);
    if symbol.is_empty() {
        return Err(NormalizeError::MissingSymbol);
    }
    Ok(symbol)
}

/// Display name, falling back to the symbol itself.
fn name_or(rec: &Record<'_>, aliases: &[&str], symbol: &str) -> String {
    let name = rec.text(aliases);
    if name.is_empty() {
        symbol.to_string()
    } else {
        name
    }
}

pub fn normalize_quote(raw: &Map<String, Value>) -> Result<StockQuote, NormalizeError> {
    let rec = Record::new(raw);
    let symbol = symbol_of(&rec)?;
    Ok(StockQuote {
        name: name_or(&rec, f::NAME, &symbol),
        price: rec.number(f::PRICE),
        changes_percentage: rec.number(f::CHANGES_PERCENTAGE),
        change: rec.number(f::CHANGE),
        day_low: rec.number(f::DAY_LOW),
        day_high: rec.number(f::DAY_HIGH),
        year_high: rec.number(f::YEAR_HIGH),
        year_low: rec.number(f::YEAR_LOW),
        market_cap: rec.number(f::MARKET_CAP),
        price_avg50: rec.number(f::PRICE_AVG_50),
        price_avg200: rec.number(f::PRICE_AVG_200),
        volume: rec.number(f::VOLUME),
        avg_volume: rec.number(f::AVG_VOLUME),
        exchange: rec.text(f::EXCHANGE),
        open: rec.number(f::OPEN),
        previous_close: rec.number(f::PREVIOUS_CLOSE),
        eps: rec.number(f::EPS),
        pe: rec.number(f::PE),
        shares_outstanding: rec.number(f::SHARES_OUTSTANDING),
        timestamp: rec.integer(f::TIMESTAMP),
        symbol,
    })
}

/// Profiles carry a subset of quote fields; the year range may only be
/// available as `"low-high"` text.
pub fn normalize_profile(raw: &Map<String, Value>) -> Result<CompanyProfile, NormalizeError> {
    let rec = Record::new(raw);
    let mut quote = normalize_quote(raw)?;

    if !rec.has(f::YEAR_HIGH) && !rec.has(f::YEAR_LOW) {
        if let Some((low, high)) = f::parse_range(&rec.text(f::PRICE_RANGE)) {
            quote.year_low = low;
            quote.year_high = high;
        }
    }
    if !rec.has(f::VOLUME) {
        quote.volume = quote.avg_volume;
    }

    Ok(CompanyProfile {
        company_name: name_or(&rec, f::COMPANY_NAME, &quote.symbol),
        industry: rec.text(f::INDUSTRY),
        sector: rec.text(f::SECTOR),
        ceo: rec.text(f::CEO),
        description: rec.text(f::DESCRIPTION),
        website: rec.text(f::WEBSITE),
        image: rec.text(f::IMAGE),
        pbr: rec.number(f::PRICE_TO_BOOK),
        dividend: rec.number(f::DIVIDEND),
        quote,
    })
}

pub fn normalize_index(raw: &Map<String, Value>) -> Result<MarketIndex, NormalizeError> {
    let rec = Record::new(raw);
    let symbol = symbol_of(&rec)?;
    Ok(MarketIndex {
        name: name_or(&rec, f::NAME, &symbol),
        price: rec.number(f::PRICE),
        changes_percentage: rec.number(f::CHANGES_PERCENTAGE),
        change: rec.number(f::CHANGE),
        symbol,
    })
}

pub fn normalize_exchange_rate(raw: &Map<String, Value>) -> Result<ExchangeRate, NormalizeError> {
    let rec = Record::new(raw);
    let pair = symbol_of(&rec)?;
    Ok(ExchangeRate {
        name: name_or(&rec, f::NAME, &pair),
        rate: rec.number(f::PRICE),
        change: rec.number(f::CHANGE),
        changes_percentage: rec.number(f::CHANGES_PERCENTAGE),
        pair,
    })
}
