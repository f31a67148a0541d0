use itertools::Itertools;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::models::capital_gain::CapitalGainTransaction;
use crate::models::dividend::DividendTransaction;
use crate::models::interest::InterestTransaction;
use crate::models::summary::{CapitalGainTotals, DividendTotals, InterestTotals, SymbolSummary};
use crate::services::taxation::{
    capital_gain_totals, dividend_totals, dividends_in_year, gains_in_year, group_gains_by_symbol,
    interest_in_year, interest_totals,
};
use crate::util::general_helpers::{format_jpy, format_usd};

/// Everything the printable document and the on-screen summary need for
/// one tax year. Derived from the full collections; owns its data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxReport {
    pub year: i32,
    pub symbol_summaries: Vec<SymbolSummary>,
    pub capital_gain_totals: CapitalGainTotals,
    pub dividends: Vec<DividendTransaction>,
    pub dividend_totals: DividendTotals,
    pub interest: Vec<InterestTransaction>,
    pub interest_totals: InterestTotals,
}

pub fn build_report(
    year: i32,
    gains: &[CapitalGainTransaction],
    dividends: &[DividendTransaction],
    interest: &[InterestTransaction],
) -> TaxReport {
    let gains = gains_in_year(gains, year);
    let dividends = dividends_in_year(dividends, year);
    let interest = interest_in_year(interest, year);

    TaxReport {
        year,
        symbol_summaries: group_gains_by_symbol(&gains),
        capital_gain_totals: capital_gain_totals(&gains),
        dividend_totals: dividend_totals(&dividends),
        dividends,
        interest_totals: interest_totals(&interest),
        interest,
    }
}

#[derive(Debug, Tabled)]
struct FormattedSymbolSummary {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Sales")]
    sales: String,
    #[tabled(rename = "Proceeds (USD)")]
    proceeds_usd: String,
    #[tabled(rename = "Cost (USD)")]
    cost_usd: String,
    #[tabled(rename = "Proceeds (JPY)")]
    proceeds_jpy: String,
    #[tabled(rename = "Cost (JPY)")]
    cost_jpy: String,
    #[tabled(rename = "Gain/Loss (JPY)")]
    gain_loss_jpy: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

#[derive(Debug, Tabled)]
struct FormattedDividend {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Gross (USD)")]
    gross_usd: String,
    #[tabled(rename = "Tax (USD)")]
    tax_usd: String,
    #[tabled(rename = "Net (USD)")]
    net_usd: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Gross (JPY)")]
    gross_jpy: String,
    #[tabled(rename = "Tax (JPY)")]
    tax_jpy: String,
    #[tabled(rename = "Net (JPY)")]
    net_jpy: String,
}

#[derive(Debug, Tabled)]
struct FormattedInterest {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Amount (USD)")]
    amount_usd: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Amount (JPY)")]
    amount_jpy: String,
}

/// Renders the plain-text document handed to the print/export layer.
pub fn render_report(report: &TaxReport) -> String {
    let mut document = String::new();
    document.push_str(&format!(
        "USD/JPY investment income summary for {}\n\n",
        report.year
    ));

    document.push_str("Capital gains by symbol\n");
    if report.symbol_summaries.is_empty() {
        document.push_str(&format!("No realized sales in {}.\n", report.year));
    } else {
        let rows: Vec<FormattedSymbolSummary> = report
            .symbol_summaries
            .iter()
            .map(|summary| FormattedSymbolSummary {
                symbol: summary.symbol.clone(),
                sales: summary.transactions.len().to_string(),
                proceeds_usd: format_usd(summary.proceeds_usd),
                cost_usd: format_usd(summary.cost_usd),
                proceeds_jpy: format_jpy(summary.proceeds_jpy),
                cost_jpy: format_jpy(summary.cost_jpy),
                gain_loss_jpy: format_jpy(summary.gain_loss_jpy),
                notes: summary
                    .transactions
                    .iter()
                    .filter_map(|transaction| transaction.note.as_deref())
                    .unique()
                    .join("; "),
            })
            .collect();
        document.push_str(&Table::new(&rows).to_string());
        document.push('\n');
        let totals = &report.capital_gain_totals;
        document.push_str(&format!(
            "{} sales, proceeds {}, cost {}, gain/loss {}\n",
            totals.count,
            format_jpy(totals.proceeds_jpy),
            format_jpy(totals.cost_jpy),
            format_jpy(totals.gain_loss_jpy)
        ));
    }

    document.push_str("\nDividends\n");
    if report.dividends.is_empty() {
        document.push_str(&format!("No dividends in {}.\n", report.year));
    } else {
        let rows: Vec<FormattedDividend> = report
            .dividends
            .iter()
            .map(|dividend| FormattedDividend {
                date: dividend.date.to_string(),
                symbol: dividend.symbol.clone(),
                gross_usd: format_usd(dividend.amount_gross_usd),
                tax_usd: format_usd(dividend.tax_usd),
                net_usd: format_usd(dividend.amount_net_usd),
                rate: dividend.rate.to_string(),
                gross_jpy: format_jpy(dividend.amount_gross_jpy),
                tax_jpy: format_jpy(dividend.tax_jpy),
                net_jpy: format_jpy(dividend.amount_net_jpy),
            })
            .collect();
        document.push_str(&Table::new(&rows).to_string());
        document.push('\n');
        let totals = &report.dividend_totals;
        document.push_str(&format!(
            "{} payments, gross {}, tax withheld {}, net {}\n",
            totals.count,
            format_jpy(totals.gross_jpy),
            format_jpy(totals.tax_jpy),
            format_jpy(totals.net_jpy)
        ));
    }

    document.push_str("\nInterest\n");
    if report.interest.is_empty() {
        document.push_str(&format!("No interest in {}.\n", report.year));
    } else {
        let rows: Vec<FormattedInterest> = report
            .interest
            .iter()
            .map(|payment| FormattedInterest {
                date: payment.date.to_string(),
                symbol: payment.symbol.clone(),
                amount_usd: format_usd(payment.amount_usd),
                rate: payment.rate.to_string(),
                amount_jpy: format_jpy(payment.amount_jpy),
            })
            .collect();
        document.push_str(&Table::new(&rows).to_string());
        document.push('\n');
        let totals = &report.interest_totals;
        document.push_str(&format!(
            "{} payments, total {}\n",
            totals.count,
            format_jpy(totals.amount_jpy)
        ));
    }

    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn gain(symbol: &str, proceeds_jpy: i64, cost_jpy: i64) -> CapitalGainTransaction {
        CapitalGainTransaction {
            id: 0,
            symbol: symbol.to_string(),
            quantity: dec!(10),
            date_acquired: NaiveDate::from_ymd_opt(2023, 1, 2),
            date_sold: NaiveDate::from_ymd_opt(2023, 3, 4).unwrap(),
            proceeds_usd: dec!(1500.00),
            cost_usd: dec!(1000.00),
            wash_sale_loss_usd: Decimal::ZERO,
            acquisition_rate: dec!(130.0),
            sale_rate: dec!(140.0),
            proceeds_jpy,
            cost_jpy,
            gain_loss_jpy: proceeds_jpy - cost_jpy,
            is_wash_sale: false,
            note: None,
        }
    }

    #[test]
    fn report_filters_to_the_requested_year() {
        let mut other_year = gain("MSFT", 100, 50);
        other_year.date_sold = NaiveDate::from_ymd_opt(2022, 7, 1).unwrap();
        let gains = vec![gain("AAPL", 210000, 130000), other_year];

        let report = build_report(2023, &gains, &[], &[]);
        assert_eq!(report.symbol_summaries.len(), 1);
        assert_eq!(report.symbol_summaries[0].symbol, "AAPL");
        assert_eq!(report.capital_gain_totals.count, 1);
        assert_eq!(report.capital_gain_totals.gain_loss_jpy, 80000);
    }

    #[test]
    fn rendered_document_carries_the_grouped_figures() {
        let gains = vec![gain("AAPL", 210000, 130000)];
        let report = build_report(2023, &gains, &[], &[]);
        let document = render_report(&report);

        assert!(document.contains("USD/JPY investment income summary for 2023"));
        assert!(document.contains("AAPL"));
        assert!(document.contains("¥ 210,000"));
        assert!(document.contains("¥ 80,000"));
        assert!(document.contains("No dividends in 2023."));
        assert!(document.contains("No interest in 2023."));
    }

    #[test]
    fn empty_report_renders_placeholders_only() {
        let report = build_report(2023, &[], &[], &[]);
        let document = render_report(&report);
        assert!(document.contains("No realized sales in 2023."));
        assert!(document.contains("No dividends in 2023."));
        assert!(document.contains("No interest in 2023."));
    }
}
