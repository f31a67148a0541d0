use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterestTransaction {
    pub id: usize,
    pub symbol: String,
    pub date: NaiveDate,
    pub amount_usd: Decimal,
    pub rate: Decimal,
    pub amount_jpy: i64,
    pub description: String,
}
