use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Utc};

use crate::models::capital_gain::CapitalGainTransaction;
use crate::models::dividend::DividendTransaction;
use crate::models::interest::InterestTransaction;
use crate::models::summary::{CapitalGainTotals, DividendTotals, InterestTotals, SymbolSummary};

// Year filtering builds a fresh view over the derived collections; the
// collections themselves are never touched.

pub fn gains_in_year(gains: &[CapitalGainTransaction], year: i32) -> Vec<CapitalGainTransaction> {
    gains
        .iter()
        .filter(|transaction| transaction.date_sold.year() == year)
        .cloned()
        .collect()
}

pub fn dividends_in_year(dividends: &[DividendTransaction], year: i32) -> Vec<DividendTransaction> {
    dividends
        .iter()
        .filter(|transaction| transaction.date.year() == year)
        .cloned()
        .collect()
}

pub fn interest_in_year(interest: &[InterestTransaction], year: i32) -> Vec<InterestTransaction> {
    interest
        .iter()
        .filter(|transaction| transaction.date.year() == year)
        .cloned()
        .collect()
}

/// Partitions capital gains by symbol with per-group running totals.
/// BTreeMap keys keep the groups in ascending symbol order so the report
/// comes out deterministic.
pub fn group_gains_by_symbol(gains: &[CapitalGainTransaction]) -> Vec<SymbolSummary> {
    let mut groups: BTreeMap<String, SymbolSummary> = BTreeMap::new();

    for transaction in gains {
        let group = groups
            .entry(transaction.symbol.clone())
            .or_insert_with(|| SymbolSummary::new(&transaction.symbol));
        group.proceeds_usd += transaction.proceeds_usd;
        group.cost_usd += transaction.cost_usd;
        group.gain_loss_usd += transaction.proceeds_usd - transaction.cost_usd;
        group.proceeds_jpy += transaction.proceeds_jpy;
        group.cost_jpy += transaction.cost_jpy;
        group.gain_loss_jpy += transaction.gain_loss_jpy;
        group.transactions.push(transaction.clone());
    }

    groups.into_values().collect()
}

pub fn capital_gain_totals(gains: &[CapitalGainTransaction]) -> CapitalGainTotals {
    let mut totals = CapitalGainTotals::default();
    for transaction in gains {
        totals.count += 1;
        totals.proceeds_usd += transaction.proceeds_usd;
        totals.cost_usd += transaction.cost_usd;
        totals.gain_loss_usd += transaction.proceeds_usd - transaction.cost_usd;
        totals.proceeds_jpy += transaction.proceeds_jpy;
        totals.cost_jpy += transaction.cost_jpy;
        totals.gain_loss_jpy += transaction.gain_loss_jpy;
    }
    totals
}

pub fn dividend_totals(dividends: &[DividendTransaction]) -> DividendTotals {
    let mut totals = DividendTotals::default();
    for transaction in dividends {
        totals.count += 1;
        totals.gross_usd += transaction.amount_gross_usd;
        totals.tax_usd += transaction.tax_usd;
        totals.net_usd += transaction.amount_net_usd;
        totals.gross_jpy += transaction.amount_gross_jpy;
        totals.tax_jpy += transaction.tax_jpy;
        totals.net_jpy += transaction.amount_net_jpy;
    }
    totals
}

pub fn interest_totals(interest: &[InterestTransaction]) -> InterestTotals {
    let mut totals = InterestTotals::default();
    for transaction in interest {
        totals.count += 1;
        totals.amount_usd += transaction.amount_usd;
        totals.amount_jpy += transaction.amount_jpy;
    }
    totals
}

/// Every calendar year present across the three collections, newest first.
/// With nothing loaded the current year stands in.
pub fn available_years(
    gains: &[CapitalGainTransaction],
    dividends: &[DividendTransaction],
    interest: &[InterestTransaction],
) -> Vec<i32> {
    let mut years: BTreeSet<i32> = BTreeSet::new();
    for transaction in gains {
        years.insert(transaction.date_sold.year());
    }
    for transaction in dividends {
        years.insert(transaction.date.year());
    }
    for transaction in interest {
        years.insert(transaction.date.year());
    }

    if years.is_empty() {
        return vec![Utc::now().year()];
    }
    years.into_iter().rev().collect()
}
