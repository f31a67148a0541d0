use rust_decimal::Decimal;
use serde::Serialize;

use super::capital_gain::CapitalGainTransaction;

/// Per-symbol running totals plus the member transactions behind them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolSummary {
    pub symbol: String,
    pub proceeds_usd: Decimal,
    pub cost_usd: Decimal,
    pub gain_loss_usd: Decimal,
    pub proceeds_jpy: i64,
    pub cost_jpy: i64,
    pub gain_loss_jpy: i64,
    pub transactions: Vec<CapitalGainTransaction>,
}

impl SymbolSummary {
    pub fn new(symbol: &str) -> Self {
        SymbolSummary {
            symbol: symbol.to_string(),
            proceeds_usd: Decimal::ZERO,
            cost_usd: Decimal::ZERO,
            gain_loss_usd: Decimal::ZERO,
            proceeds_jpy: 0,
            cost_jpy: 0,
            gain_loss_jpy: 0,
            transactions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CapitalGainTotals {
    pub count: usize,
    pub proceeds_usd: Decimal,
    pub cost_usd: Decimal,
    pub gain_loss_usd: Decimal,
    pub proceeds_jpy: i64,
    pub cost_jpy: i64,
    pub gain_loss_jpy: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DividendTotals {
    pub count: usize,
    pub gross_usd: Decimal,
    pub tax_usd: Decimal,
    pub net_usd: Decimal,
    pub gross_jpy: i64,
    pub tax_jpy: i64,
    pub net_jpy: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterestTotals {
    pub count: usize,
    pub amount_usd: Decimal,
    pub amount_jpy: i64,
}
