use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapitalGainTransaction {
    pub id: usize,
    pub symbol: String,
    pub quantity: Decimal,
    // None marks an aggregated lot sold as "VARIOUS"
    pub date_acquired: Option<NaiveDate>,
    pub date_sold: NaiveDate,
    pub proceeds_usd: Decimal,
    pub cost_usd: Decimal,
    pub wash_sale_loss_usd: Decimal,
    pub acquisition_rate: Decimal,
    pub sale_rate: Decimal,
    pub proceeds_jpy: i64,
    pub cost_jpy: i64,
    // always the difference of the two already-floored JPY amounts
    pub gain_loss_jpy: i64,
    pub is_wash_sale: bool,
    pub note: Option<String>,
}
