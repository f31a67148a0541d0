use serde::Deserialize;
use tracing::warn;

use crate::models::dividend::DividendTransaction;
use crate::models::interest::InterestTransaction;
use crate::services::market_data::fx_rates::{resolve_rate, RateTable};
use crate::util::general_helpers::{extract_withheld_tax, parse_flexible_date, parse_money, to_floored_jpy};

/// One row of a unified history export. The same shape backs the dividend
/// and interest subsets after partitioning by action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryRecord {
    #[serde(rename = "Symbol", default)]
    pub symbol: String,
    #[serde(rename = "Action", default)]
    pub action: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "TradeDate", default)]
    pub trade_date: String,
    #[serde(rename = "Amount", default)]
    pub net_amount: String,
}

/// Dividends are reported net; the withheld tax hides in the description
/// text and gross is reconstructed as net + tax. The three JPY amounts are
/// floored independently, never derived from one another after rounding.
pub fn derive_dividends(rows: &[HistoryRecord], rates: &RateTable) -> Vec<DividendTransaction> {
    let mut transactions: Vec<DividendTransaction> = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(date) = parse_flexible_date(&row.trade_date) else {
            warn!(symbol = %row.symbol, trade_date = %row.trade_date, "dropping dividend without a usable trade date");
            continue;
        };

        let amount_net_usd = parse_money(&row.net_amount);
        let tax_usd = extract_withheld_tax(&row.description);
        let amount_gross_usd = amount_net_usd + tax_usd;

        let resolved = resolve_rate(date, rates);
        if resolved.rate.is_zero() && !rates.is_empty() {
            warn!(symbol = %row.symbol, %date, "no USD/JPY rate for dividend");
        }

        transactions.push(DividendTransaction {
            id: transactions.len(),
            symbol: row.symbol.clone(),
            date,
            amount_net_usd,
            tax_usd,
            amount_gross_usd,
            rate: resolved.rate,
            amount_gross_jpy: to_floored_jpy(amount_gross_usd, resolved.rate),
            tax_jpy: to_floored_jpy(tax_usd, resolved.rate),
            amount_net_jpy: to_floored_jpy(amount_net_usd, resolved.rate),
            description: row.description.clone(),
        });
    }

    transactions
}

pub fn derive_interest(rows: &[HistoryRecord], rates: &RateTable) -> Vec<InterestTransaction> {
    let mut transactions: Vec<InterestTransaction> = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(date) = parse_flexible_date(&row.trade_date) else {
            warn!(symbol = %row.symbol, trade_date = %row.trade_date, "dropping interest payment without a usable trade date");
            continue;
        };

        let amount_usd = parse_money(&row.net_amount);
        let resolved = resolve_rate(date, rates);
        if resolved.rate.is_zero() && !rates.is_empty() {
            warn!(symbol = %row.symbol, %date, "no USD/JPY rate for interest payment");
        }

        transactions.push(InterestTransaction {
            id: transactions.len(),
            symbol: row.symbol.clone(),
            date,
            amount_usd,
            rate: resolved.rate,
            amount_jpy: to_floored_jpy(amount_usd, resolved.rate),
            description: row.description.clone(),
        });
    }

    transactions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn dividend_row() -> HistoryRecord {
        HistoryRecord {
            symbol: "ACME".to_string(),
            action: "Dividend".to_string(),
            description: "ACME CORP CASH DIV NON-RES TAX WITHHELD $1.50".to_string(),
            trade_date: "2023-06-15".to_string(),
            net_amount: "$8.50".to_string(),
        }
    }

    fn rates() -> RateTable {
        let mut table = RateTable::new();
        table.insert(NaiveDate::from_ymd_opt(2023, 6, 15).unwrap(), dec!(145.2));
        table
    }

    #[test]
    fn reconstructs_gross_from_net_and_withheld_tax() {
        let derived = derive_dividends(&[dividend_row()], &rates());
        assert_eq!(derived.len(), 1);
        let dividend = &derived[0];
        assert_eq!(dividend.tax_usd, dec!(1.50));
        assert_eq!(dividend.amount_gross_usd, dec!(10.00));
        assert_eq!(dividend.amount_net_jpy, 1234);
        assert_eq!(dividend.tax_jpy, 217);
        assert_eq!(dividend.amount_gross_jpy, 1452);
    }

    #[test]
    fn gross_equals_net_plus_tax_in_usd() {
        let mut row = dividend_row();
        row.description = "FOREIGN CO ADR TAX WITHHELD $0.33".to_string();
        row.net_amount = "$1.99".to_string();
        let derived = derive_dividends(&[row], &rates());
        assert_eq!(
            derived[0].amount_gross_usd,
            derived[0].amount_net_usd + derived[0].tax_usd
        );
    }

    #[test]
    fn missing_tax_phrase_means_zero_withheld() {
        let mut row = dividend_row();
        row.description = "ACME CORP CASH DIV".to_string();
        let derived = derive_dividends(&[row], &rates());
        assert_eq!(derived[0].tax_usd, Decimal::ZERO);
        assert_eq!(derived[0].amount_gross_usd, derived[0].amount_net_usd);
        assert_eq!(derived[0].tax_jpy, 0);
    }

    #[test]
    fn unparseable_trade_date_drops_the_row() {
        let mut bad = dividend_row();
        bad.trade_date = "someday".to_string();
        let derived = derive_dividends(&[bad, dividend_row()], &rates());
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].id, 0);
    }

    #[test]
    fn interest_converts_without_a_tax_component() {
        let row = HistoryRecord {
            symbol: "CASH".to_string(),
            action: "Interest".to_string(),
            description: "CREDIT INTEREST".to_string(),
            trade_date: "2023-06-15".to_string(),
            net_amount: "$100.00".to_string(),
        };
        let derived = derive_interest(&[row], &rates());
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].amount_usd, dec!(100.00));
        assert_eq!(derived[0].amount_jpy, 14520);
    }

    #[test]
    fn weekend_payments_use_the_prior_published_rate() {
        let mut row = dividend_row();
        row.trade_date = "2023-06-17".to_string(); // Saturday
        let derived = derive_dividends(&[row], &rates());
        assert_eq!(derived[0].rate, dec!(145.2));
    }

    #[test]
    fn rate_miss_yields_zero_jpy_amounts() {
        let derived = derive_dividends(&[dividend_row()], &RateTable::new());
        assert_eq!(derived[0].rate, Decimal::ZERO);
        assert_eq!(derived[0].amount_gross_jpy, 0);
        assert_eq!(derived[0].amount_net_jpy, 0);
    }
}
