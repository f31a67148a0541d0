use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{Duration, NaiveDate};
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, info};

/// Daily USD/JPY rates keyed by date. Sparse: the provider publishes
/// business days only. Replaced wholesale on every fetch.
pub type RateTable = BTreeMap<NaiveDate, Decimal>;

/// Total lookup attempts per date: the date itself plus up to 9 prior days.
pub const RATE_LOOKBACK_DAYS: i64 = 10;

const RATE_API_BASE: &str = "https://api.frankfurter.app";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRate {
    pub rate: Decimal,
    // None means no entry within the fallback window
    pub date_used: Option<NaiveDate>,
}

/// Looks up the rate for a date, stepping backward one calendar day at a
/// time so weekend and holiday transactions pick up the most recent
/// published rate. A miss across the whole window returns rate 0, which
/// downstream code must surface as a failed lookup rather than a real rate.
pub fn resolve_rate(date: NaiveDate, rates: &RateTable) -> ResolvedRate {
    for offset in 0..RATE_LOOKBACK_DAYS {
        let candidate = date - Duration::days(offset);
        if let Some(rate) = rates.get(&candidate) {
            return ResolvedRate {
                rate: *rate,
                date_used: Some(candidate),
            };
        }
    }
    debug!(%date, "no USD/JPY rate within the fallback window");
    ResolvedRate {
        rate: Decimal::ZERO,
        date_used: None,
    }
}

/// Fetches the daily USD/JPY series for an inclusive date range.
pub async fn fetch_usd_jpy_rates(start: NaiveDate, end: NaiveDate) -> anyhow::Result<RateTable> {
    let client = Client::new();
    let res = client
        .get(format!("{}/{}..{}?from=USD&to=JPY", RATE_API_BASE, start, end))
        .header("Accept", "application/json")
        .send()
        .await?;

    if !res.status().is_success() {
        return Err(anyhow!("rate provider returned status {}", res.status()));
    }

    let body = res.text().await?;
    let table = parse_rate_series(&body)?;
    info!(days = table.len(), %start, %end, "fetched USD/JPY rate series");
    Ok(table)
}

pub fn parse_rate_series(body: &str) -> anyhow::Result<RateTable> {
    let data: Value = serde_json::from_str(body)?;
    let days = data["rates"]
        .as_object()
        .ok_or_else(|| anyhow!("rate series has no \"rates\" object"))?;

    let mut table = RateTable::new();
    for (date_str, quotes) in days {
        let date = NaiveDate::from_str(date_str)?;
        let rate = match &quotes["JPY"] {
            Value::Number(quote) => quote.to_string().parse::<Decimal>()?,
            _ => continue,
        };
        if rate != Decimal::ZERO {
            table.insert(date, rate);
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn exact_date_hit_uses_that_date() {
        let mut rates = RateTable::new();
        rates.insert(date(2023, 3, 4), dec!(140.0));
        let resolved = resolve_rate(date(2023, 3, 4), &rates);
        assert_eq!(resolved.rate, dec!(140.0));
        assert_eq!(resolved.date_used, Some(date(2023, 3, 4)));
    }

    #[test]
    fn falls_back_to_most_recent_prior_rate() {
        let mut rates = RateTable::new();
        rates.insert(date(2023, 3, 3), dec!(139.5));
        // 3/5 is a Sunday: two steps back
        let resolved = resolve_rate(date(2023, 3, 5), &rates);
        assert_eq!(resolved.rate, dec!(139.5));
        assert_eq!(resolved.date_used, Some(date(2023, 3, 3)));
    }

    #[test]
    fn nine_days_back_is_the_last_attempt() {
        let mut rates = RateTable::new();
        rates.insert(date(2023, 3, 1), dec!(138.0));
        let resolved = resolve_rate(date(2023, 3, 10), &rates);
        assert_eq!(resolved.rate, dec!(138.0));
        assert_eq!(resolved.date_used, Some(date(2023, 3, 1)));

        let missed = resolve_rate(date(2023, 3, 11), &rates);
        assert_eq!(missed.rate, Decimal::ZERO);
        assert_eq!(missed.date_used, None);
    }

    #[test]
    fn miss_returns_zero_and_no_date() {
        let resolved = resolve_rate(date(2023, 3, 4), &RateTable::new());
        assert_eq!(resolved.rate, Decimal::ZERO);
        assert_eq!(resolved.date_used, None);
    }

    #[test]
    fn parses_provider_series_body() {
        let body = r#"{
            "amount": 1.0,
            "base": "USD",
            "start_date": "2023-01-02",
            "end_date": "2023-01-04",
            "rates": {
                "2023-01-02": { "JPY": 130.0 },
                "2023-01-03": { "JPY": 131.25 },
                "2023-01-04": { "JPY": 0.0 }
            }
        }"#;
        let table = parse_rate_series(body).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[&date(2023, 1, 2)], dec!(130.0));
        assert_eq!(table[&date(2023, 1, 3)], dec!(131.25));
    }

    #[test]
    fn rejects_bodies_without_a_rates_object() {
        assert!(parse_rate_series(r#"{"error": "not found"}"#).is_err());
        assert!(parse_rate_series("not json").is_err());
    }
}
