use serde::Deserialize;
use tracing::warn;

use crate::models::capital_gain::CapitalGainTransaction;
use crate::services::market_data::fx_rates::{resolve_rate, RateTable};
use crate::util::general_helpers::{parse_flexible_date, parse_money, to_floored_jpy};

pub const NOTE_VARIOUS_DATES: &str = "Acquired on various dates";
pub const NOTE_RATE_NOT_FOUND: &str = "No USD/JPY rate found";

/// One row of a realized gain/loss export, untouched field text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GainLossRecord {
    #[serde(rename = "Symbol", default)]
    pub symbol: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Quantity", default)]
    pub quantity: String,
    #[serde(rename = "Date Acquired", default)]
    pub date_acquired: String,
    #[serde(rename = "Date Sold", default)]
    pub date_sold: String,
    #[serde(rename = "Sales Proceeds", default)]
    pub sales_proceeds: String,
    #[serde(rename = "Adjust Cost", default)]
    pub adjusted_cost: String,
    #[serde(rename = "WS Loss Disallowed", default)]
    pub wash_sale_loss_disallowed: String,
    #[serde(rename = "Wash Sales", default)]
    pub wash_sale_flag: String,
}

fn is_various(text: &str) -> bool {
    text.to_lowercase().contains("various")
}

/// Derives dated, JPY-converted sale records from raw gain/loss rows.
/// Pure in (rows, rates); rerun in full whenever either input changes.
pub fn derive_capital_gains(
    rows: &[GainLossRecord],
    rates: &RateTable,
) -> Vec<CapitalGainTransaction> {
    let mut transactions: Vec<CapitalGainTransaction> = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(date_sold) = parse_flexible_date(&row.date_sold) else {
            warn!(symbol = %row.symbol, date_sold = %row.date_sold, "dropping row without a usable sale date");
            continue;
        };

        // a VARIOUS lot keeps no acquisition date; any other unparseable
        // date falls back to the sale date so the row stays convertible
        let (date_acquired, various) = match parse_flexible_date(&row.date_acquired) {
            Some(date) => (Some(date), false),
            None if is_various(&row.date_acquired) => (None, true),
            None => (Some(date_sold), false),
        };

        let proceeds_usd = parse_money(&row.sales_proceeds);
        let cost_usd = parse_money(&row.adjusted_cost);

        let acquisition = resolve_rate(date_acquired.unwrap_or(date_sold), rates);
        let sale = resolve_rate(date_sold, rates);

        let proceeds_jpy = to_floored_jpy(proceeds_usd, sale.rate);
        let cost_jpy = to_floored_jpy(cost_usd, acquisition.rate);

        // one note field; the various-date note wins over a rate miss
        let note = if various {
            Some(NOTE_VARIOUS_DATES.to_string())
        } else if sale.rate.is_zero() {
            Some(NOTE_RATE_NOT_FOUND.to_string())
        } else {
            None
        };

        transactions.push(CapitalGainTransaction {
            id: transactions.len(),
            symbol: row.symbol.clone(),
            quantity: parse_money(&row.quantity),
            date_acquired,
            date_sold,
            proceeds_usd,
            cost_usd,
            wash_sale_loss_usd: parse_money(&row.wash_sale_loss_disallowed),
            acquisition_rate: acquisition.rate,
            sale_rate: sale.rate,
            proceeds_jpy,
            cost_jpy,
            gain_loss_jpy: proceeds_jpy - cost_jpy,
            is_wash_sale: row.wash_sale_flag == "YES",
            note,
        });
    }

    transactions
}
