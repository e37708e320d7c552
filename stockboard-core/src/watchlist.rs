//! Watch-list configuration: the symbols each dataset covers.
//!
//! Stored under `[watchlist]` in the TOML config. Market instruments are
//! grouped by kind so the market snapshot can split indexes from forex and
//! commodity "extras" without guessing from symbol syntax.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Watchlist {
    /// US equities (`us-stocks.json`).
    pub us: Vec<String>,
    /// KOSPI equities, `.KS` suffix (`kr-stocks.json`).
    pub kospi: Vec<String>,
    /// KOSDAQ equities, `.KQ` suffix (`kr-stocks.json`).
    pub kosdaq: Vec<String>,
    /// Market indexes (`market-indexes.json` → `indexes`).
    pub indexes: Vec<String>,
    /// Forex pairs (`market-indexes.json` → `extras`).
    pub forex: Vec<String>,
    /// Commodities (`market-indexes.json` → `extras`).
    pub commodities: Vec<String>,
}

impl Watchlist {
    /// Korean equities, KOSPI first.
    pub fn korean(&self) -> Vec<String> {
        self.kospi.iter().chain(&self.kosdaq).cloned().collect()
    }

    /// Every equity, US first. Profiles and history cover this list.
    pub fn equities(&self) -> Vec<String> {
        let mut all: Vec<String> = self.us.iter().chain(&self.kospi).chain(&self.kosdaq).cloned().collect();
        dedup_preserving_order(&mut all);
        all
    }

    /// Forex pairs then commodities.
    pub fn extras(&self) -> Vec<String> {
        self.forex.iter().chain(&self.commodities).cloned().collect()
    }

    pub fn symbol_count(&self) -> usize {
        self.equities().len() + self.indexes.len() + self.extras().len()
    }

    /// Trim entries and drop blanks and repeats within each list.
    pub fn cleaned(mut self) -> Self {
        for list in [
            &mut self.us,
            &mut self.kospi,
            &mut self.kosdaq,
            &mut self.indexes,
            &mut self.forex,
            &mut self.commodities,
        ] {
            for s in list.iter_mut() {
                *s = s.trim().to_string();
            }
            list.retain(|s| !s.is_empty());
            dedup_preserving_order(list);
        }
        self
    }
}

impl Default for Watchlist {
    fn default() -> Self {
        fn owned(symbols: &[&str]) -> Vec<String> {
            symbols.iter().map(|s| s.to_string()).collect()
        }

        Self {
            us: owned(&[
                "AAPL", "MSFT", "NVDA", "GOOGL", "AMZN", "META", "BRK-B", "TSLA", "UNH", "LLY",
                "JPM", "XOM", "V", "JNJ", "PG", "MA", "AVGO", "HD", "MRK", "COST", "ABBV", "PEP",
                "KO", "ADBE", "CRM", "WMT", "BAC", "NFLX", "TMO", "AMD",
            ]),
            kospi: owned(&[
                "005930.KS", "000660.KS", "373220.KS", "207940.KS", "005380.KS", "000270.KS",
                "068270.KS", "035420.KS", "105560.KS", "055550.KS",
            ]),
            kosdaq: owned(&[
                "247540.KQ", "086520.KQ", "196170.KQ", "028300.KQ", "263750.KQ", "293490.KQ",
                "041510.KQ", "035900.KQ",
            ]),
            indexes: owned(&["^GSPC", "^IXIC", "^NYA", "^KS11", "^KQ11"]),
            forex: owned(&["USDKRW"]),
            commodities: owned(&["GCUSD", "SIUSD"]),
        }
    }
}

/// Symbols compare case-insensitively; the first spelling is kept.
fn dedup_preserving_order(list: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    list.retain(|s| seen.insert(s.to_ascii_uppercase()));
}
