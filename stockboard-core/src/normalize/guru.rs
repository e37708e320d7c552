use super::fields::{self as f, Record};
use super::response_records;
use crate::model::{HouseTrade, InstitutionalHolding, TradeType};
use serde_json::Value;

/// Normalize a 13F holdings response. Entries without a symbol are dropped.
///
/// Newer filing extracts carry no portfolio weights; when no entry has one,
/// weights are derived from each position's share of total value.
pub fn normalize_holdings(response: &Value) -> Vec<InstitutionalHolding> {
    let records = response_records(response);
    let has_weights = records.iter().any(|raw| Record::new(raw).has(f::WEIGHT));

    let mut holdings: Vec<InstitutionalHolding> = records
        .into_iter()
        .filter_map(|raw| {
            let rec = Record::new(raw);
            let symbol = rec.text(f::SYMBOL);
            if symbol.is_empty() {
                return None;
            }
            let shares_number = rec.number(f::SHARES_NUMBER);
            let last_shares_number = rec.number(f::LAST_SHARES_NUMBER);
            let opened = rec.has(f::LAST_SHARES_NUMBER) && last_shares_number == 0.0 && shares_number > 0.0;
            let exited = shares_number == 0.0 && last_shares_number > 0.0;
            Some(InstitutionalHolding {
                date: rec.text(f::DATE),
                filing_date: rec.text(f::FILING_DATE),
                cik: rec.text(f::CIK),
                name_of_issuer: rec.text(f::NAME_OF_ISSUER),
                shares: rec.number(f::SHARES),
                title_of_class: rec.text(f::TITLE_OF_CLASS),
                value: rec.number(f::VALUE),
                weight: rec.number(f::WEIGHT),
                last_weight: rec.number(f::LAST_WEIGHT),
                change_in_weight: rec.number(f::CHANGE_IN_WEIGHT),
                change_in_weight_percentage: rec.number(f::CHANGE_IN_WEIGHT_PERCENTAGE),
                shares_number,
                last_shares_number,
                change_in_shares_number: rec.number(f::CHANGE_IN_SHARES_NUMBER),
                change_in_shares_number_percentage: rec
                    .number(f::CHANGE_IN_SHARES_NUMBER_PERCENTAGE),
                is_new: rec.flag(f::IS_NEW).unwrap_or(opened),
                is_sold_out: rec.flag(f::IS_SOLD_OUT).unwrap_or(exited),
                symbol,
            })
        })
        .collect();

    if !has_weights {
        let total: f64 = holdings.iter().map(|h| h.value).sum();
        if total > 0.0 {
            for h in &mut holdings {
                h.weight = h.value / total * 100.0;
            }
        }
    }

    holdings
}

/// Normalize a congressional disclosure response. Entries without a ticker
/// (bonds, private funds) are dropped.
pub fn normalize_house_trades(response: &Value) -> Vec<HouseTrade> {
    response_records(response)
        .into_iter()
        .filter_map(|raw| {
            let rec = Record::new(raw);
            let symbol = rec.text(f::SYMBOL);
            if symbol.is_empty() || symbol == "--" {
                return None;
            }
            Some(HouseTrade {
                disclosure_date: rec.text(f::DISCLOSURE_DATE),
                transaction_date: rec.text(f::TRANSACTION_DATE),
                first_name: rec.text(f::FIRST_NAME),
                last_name: rec.text(f::LAST_NAME),
                office: rec.text(f::OFFICE),
                owner: rec.text(f::OWNER),
                trade_type: TradeType::classify(&rec.text(f::TRADE_TYPE)),
                amount: rec.text(f::AMOUNT),
                link: rec.text(f::LINK),
                symbol,
            })
        })
        .collect()
}
