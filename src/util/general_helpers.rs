use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses currency-formatted text ("$1,234.56", "-$12.00") into a Decimal.
/// Empty or unparseable input yields 0. Parenthesized negatives without a
/// minus sign are not recognized.
pub fn parse_money(text: &str) -> Decimal {
    let stripped: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if stripped.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&stripped).unwrap_or(Decimal::ZERO)
}

/// Best-effort date sniffing over the two conventions brokerage exports use:
/// "/" means month/day/year, "-" means ISO year-month-day. Text flagged as
/// "VARIOUS" (aggregated lots) never parses.
pub fn parse_flexible_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.to_lowercase().contains("various") {
        return None;
    }
    if trimmed.contains('/') {
        return NaiveDate::parse_from_str(trimmed, "%m/%d/%Y").ok();
    }
    if trimmed.contains('-') {
        return NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok();
    }
    None
}

/// Pulls a withheld-tax amount out of free-text descriptions like
/// "NON-RES TAX WITHHELD $1.23". Absence of the phrase yields 0.
pub fn extract_withheld_tax(description: &str) -> Decimal {
    let regex = Regex::new(r"(?i)tax\s+withheld\s*:?\s*\$?\s*(-?[0-9][0-9,]*(?:\.[0-9]+)?)").unwrap();
    match regex.captures(description) {
        Some(caps) => parse_money(caps.get(1).map(|m| m.as_str()).unwrap_or_default()),
        None => Decimal::ZERO,
    }
}

/// JPY amounts are floored at the point of conversion, one field at a time.
pub fn to_floored_jpy(amount_usd: Decimal, rate: Decimal) -> i64 {
    (amount_usd * rate).floor().to_i64().unwrap_or(0)
}

pub fn format_jpy(amount: i64) -> String {
    format!("¥ {}", amount.to_formatted_string(&Locale::ja))
}

pub fn format_usd(amount: Decimal) -> String {
    format!("$ {:.2}", amount)
}
