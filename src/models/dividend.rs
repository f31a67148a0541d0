use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendTransaction {
    pub id: usize,
    pub symbol: String,
    pub date: NaiveDate,
    pub amount_net_usd: Decimal,
    pub tax_usd: Decimal,
    // gross = net + tax holds exactly in USD; the three JPY fields are
    // floored independently and are not required to add up after rounding
    pub amount_gross_usd: Decimal,
    pub rate: Decimal,
    pub amount_gross_jpy: i64,
    pub tax_jpy: i64,
    pub amount_net_jpy: i64,
    pub description: String,
}
