//! Snapshot record types.
//!
//! These are the shapes written to disk and read by the dashboard. Field
//! names serialize in camelCase; every numeric field is always present.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point-in-time price/volume snapshot for one equity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub changes_percentage: f64,
    pub change: f64,
    pub day_low: f64,
    pub day_high: f64,
    pub year_high: f64,
    pub year_low: f64,
    pub market_cap: f64,
    pub price_avg50: f64,
    pub price_avg200: f64,
    pub volume: f64,
    pub avg_volume: f64,
    pub exchange: String,
    pub open: f64,
    pub previous_close: f64,
    pub eps: f64,
    pub pe: f64,
    pub shares_outstanding: f64,
    pub timestamp: i64,
}

/// Company reference data joined to its quote by symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    #[serde(flatten)]
    pub quote: StockQuote,
    pub company_name: String,
    pub industry: String,
    pub sector: String,
    pub ceo: String,
    pub description: String,
    pub website: String,
    pub image: String,
    pub pbr: f64,
    pub dividend: f64,
}

/// `profiles.json`: symbol → profile.
pub type ProfileMap = BTreeMap<String, CompanyProfile>;

/// Reduced quote for a market index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketIndex {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub changes_percentage: f64,
    pub change: f64,
}

/// Reduced quote for a forex pair or commodity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub pair: String,
    pub name: String,
    pub rate: f64,
    pub change: f64,
    pub changes_percentage: f64,
}

/// `market-indexes.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub indexes: Vec<MarketIndex>,
    pub extras: Vec<ExchangeRate>,
}

impl MarketSnapshot {
    pub fn len(&self) -> usize {
        self.indexes.len() + self.extras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// `historical/<SYMBOL>.json`. Points are sorted ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub symbol: String,
    pub historical: Vec<PricePoint>,
}

/// One position from an institutional investor's 13F filing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionalHolding {
    pub date: String,
    pub filing_date: String,
    pub cik: String,
    pub symbol: String,
    pub name_of_issuer: String,
    pub shares: f64,
    pub title_of_class: String,
    pub value: f64,
    pub weight: f64,
    pub last_weight: f64,
    pub change_in_weight: f64,
    pub change_in_weight_percentage: f64,
    pub shares_number: f64,
    pub last_shares_number: f64,
    pub change_in_shares_number: f64,
    pub change_in_shares_number_percentage: f64,
    pub is_new: bool,
    pub is_sold_out: bool,
}

/// Kind of disclosed congressional transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeType {
    Purchase,
    SaleFull,
    SalePartial,
    Exchange,
    #[default]
    Unknown,
}

impl TradeType {
    /// Classify the provider's free-text transaction type.
    pub fn classify(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        if lower.starts_with("purchase") || lower == "buy" {
            TradeType::Purchase
        } else if lower.starts_with("sale") || lower.starts_with("sell") {
            if lower.contains("partial") {
                TradeType::SalePartial
            } else {
                // "Sale", "Sale (Full)" and "sale_full" all report a full exit
                TradeType::SaleFull
            }
        } else if lower.starts_with("exchange") {
            TradeType::Exchange
        } else {
            TradeType::Unknown
        }
    }
}

/// One disclosed securities transaction by a member of the House.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseTrade {
    pub symbol: String,
    pub disclosure_date: String,
    pub transaction_date: String,
    pub first_name: String,
    pub last_name: String,
    pub office: String,
    pub owner: String,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub amount: String,
    pub link: String,
}
