//! Endpoint tables for each provider API version.

use super::Endpoint;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days after quarter end by which 13F filings are due.
const FILING_LAG_DAYS: i64 = 45;

/// Which generation of the provider API to call.
///
/// `Stable` takes symbols as query parameters; `Legacy` (v3/v4) puts them in
/// the path. Field names differ too, which `normalize::fields` absorbs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiVersion {
    #[default]
    Stable,
    Legacy,
}

impl ApiVersion {
    pub fn default_base_url(self) -> &'static str {
        match self {
            ApiVersion::Stable => "https://financialmodelingprep.com/stable",
            ApiVersion::Legacy => "https://financialmodelingprep.com/api",
        }
    }

    /// Multi-symbol quote request.
    pub fn batch_quote(self, symbols: &[String]) -> Endpoint {
        let joined = symbols.join(",");
        match self {
            ApiVersion::Stable => Endpoint::new("batch-quote").param("symbols", joined),
            ApiVersion::Legacy => Endpoint::new(format!("v3/quote/{joined}")),
        }
    }

    pub fn quote(self, symbol: &str) -> Endpoint {
        match self {
            ApiVersion::Stable => Endpoint::new("quote").param("symbol", symbol),
            ApiVersion::Legacy => Endpoint::new(format!("v3/quote/{symbol}")),
        }
    }

    pub fn profile(self, symbol: &str) -> Endpoint {
        match self {
            ApiVersion::Stable => Endpoint::new("profile").param("symbol", symbol),
            ApiVersion::Legacy => Endpoint::new(format!("v3/profile/{symbol}")),
        }
    }

    /// Daily closes from `from` (inclusive) to today.
    pub fn historical(self, symbol: &str, from: NaiveDate) -> Endpoint {
        let from = from.format("%Y-%m-%d").to_string();
        match self {
            ApiVersion::Stable => Endpoint::new("historical-price-eod/light")
                .param("symbol", symbol)
                .param("from", from),
            ApiVersion::Legacy => {
                Endpoint::new(format!("v3/historical-price-full/{symbol}")).param("from", from)
            }
        }
    }

    /// 13F holdings for one filer and report period.
    pub fn institutional_holdings(self, cik: &str, period: ReportPeriod) -> Endpoint {
        match self {
            ApiVersion::Stable => Endpoint::new("institutional-ownership/extract")
                .param("cik", cik)
                .param("year", period.year.to_string())
                .param("quarter", period.quarter.to_string()),
            ApiVersion::Legacy => Endpoint::new("v4/institutional-ownership/portfolio-holdings")
                .param("cik", cik)
                .param("date", period.end_date().format("%Y-%m-%d").to_string()),
        }
    }

    /// Periodic transaction reports filed by one House member.
    pub fn house_trades(self, name: &str) -> Endpoint {
        match self {
            ApiVersion::Stable => Endpoint::new("house-trades-by-name").param("name", name),
            ApiVersion::Legacy => Endpoint::new("v4/house-disclosure").param("name", name),
        }
    }
}

/// A calendar quarter that 13F filings report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    pub year: i32,
    /// 1..=4
    pub quarter: u32,
}

impl ReportPeriod {
    /// Most recent quarter whose filing deadline has passed as of `today`.
    pub fn latest_filed(today: NaiveDate) -> Self {
        let mut period = Self {
            year: today.year(),
            quarter: today.month0() / 3 + 1,
        }
        .previous();
        while period.end_date() + Duration::days(FILING_LAG_DAYS) > today {
            period = period.previous();
        }
        period
    }

    pub fn previous(self) -> Self {
        if self.quarter <= 1 {
            Self {
                year: self.year - 1,
                quarter: 4,
            }
        } else {
            Self {
                year: self.year,
                quarter: self.quarter - 1,
            }
        }
    }

    pub fn end_date(self) -> NaiveDate {
        let (month, day) = match self.quarter {
            1 => (3, 31),
            2 => (6, 30),
            3 => (9, 30),
            _ => (12, 31),
        };
        NaiveDate::from_ymd_opt(self.year, month, day).unwrap_or(NaiveDate::MIN)
    }
}
