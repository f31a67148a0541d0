use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::capital_gain::CapitalGainTransaction;
use crate::models::dividend::DividendTransaction;
use crate::models::interest::InterestTransaction;

// spreadsheet apps only detect UTF-8 reliably when the BOM is present
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

#[derive(Debug, Serialize)]
struct CapitalGainExportRow {
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Quantity")]
    quantity: Decimal,
    #[serde(rename = "Date Acquired")]
    date_acquired: String,
    #[serde(rename = "Date Sold")]
    date_sold: String,
    #[serde(rename = "Proceeds (USD)")]
    proceeds_usd: Decimal,
    #[serde(rename = "Cost (USD)")]
    cost_usd: Decimal,
    #[serde(rename = "WS Loss Disallowed (USD)")]
    wash_sale_loss_usd: Decimal,
    #[serde(rename = "Rate (Acquisition)")]
    acquisition_rate: Decimal,
    #[serde(rename = "Rate (Sale)")]
    sale_rate: Decimal,
    #[serde(rename = "Proceeds (JPY)")]
    proceeds_jpy: i64,
    #[serde(rename = "Cost (JPY)")]
    cost_jpy: i64,
    #[serde(rename = "Gain/Loss (JPY)")]
    gain_loss_jpy: i64,
    #[serde(rename = "Wash Sale")]
    wash_sale: String,
    #[serde(rename = "Notes")]
    notes: String,
}

impl From<&CapitalGainTransaction> for CapitalGainExportRow {
    fn from(transaction: &CapitalGainTransaction) -> Self {
        CapitalGainExportRow {
            symbol: transaction.symbol.clone(),
            quantity: transaction.quantity,
            date_acquired: match transaction.date_acquired {
                Some(date) => date.to_string(),
                None => "VARIOUS".to_string(),
            },
            date_sold: transaction.date_sold.to_string(),
            proceeds_usd: transaction.proceeds_usd,
            cost_usd: transaction.cost_usd,
            wash_sale_loss_usd: transaction.wash_sale_loss_usd,
            acquisition_rate: transaction.acquisition_rate,
            sale_rate: transaction.sale_rate,
            proceeds_jpy: transaction.proceeds_jpy,
            cost_jpy: transaction.cost_jpy,
            gain_loss_jpy: transaction.gain_loss_jpy,
            wash_sale: if transaction.is_wash_sale { "YES" } else { "" }.to_string(),
            notes: transaction.note.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DividendExportRow {
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Gross (USD)")]
    gross_usd: Decimal,
    #[serde(rename = "Tax Withheld (USD)")]
    tax_usd: Decimal,
    #[serde(rename = "Net (USD)")]
    net_usd: Decimal,
    #[serde(rename = "Rate")]
    rate: Decimal,
    #[serde(rename = "Gross (JPY)")]
    gross_jpy: i64,
    #[serde(rename = "Tax Withheld (JPY)")]
    tax_jpy: i64,
    #[serde(rename = "Net (JPY)")]
    net_jpy: i64,
    #[serde(rename = "Description")]
    description: String,
}

impl From<&DividendTransaction> for DividendExportRow {
    fn from(transaction: &DividendTransaction) -> Self {
        DividendExportRow {
            symbol: transaction.symbol.clone(),
            date: transaction.date.to_string(),
            gross_usd: transaction.amount_gross_usd,
            tax_usd: transaction.tax_usd,
            net_usd: transaction.amount_net_usd,
            rate: transaction.rate,
            gross_jpy: transaction.amount_gross_jpy,
            tax_jpy: transaction.tax_jpy,
            net_jpy: transaction.amount_net_jpy,
            description: transaction.description.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct InterestExportRow {
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Amount (USD)")]
    amount_usd: Decimal,
    #[serde(rename = "Rate")]
    rate: Decimal,
    #[serde(rename = "Amount (JPY)")]
    amount_jpy: i64,
    #[serde(rename = "Description")]
    description: String,
}

impl From<&InterestTransaction> for InterestExportRow {
    fn from(transaction: &InterestTransaction) -> Self {
        InterestExportRow {
            symbol: transaction.symbol.clone(),
            date: transaction.date.to_string(),
            amount_usd: transaction.amount_usd,
            rate: transaction.rate,
            amount_jpy: transaction.amount_jpy,
            description: transaction.description.clone(),
        }
    }
}

fn export_rows<T: Serialize>(rows: Vec<T>) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = UTF8_BOM.to_vec();
    {
        let mut wtr = Writer::from_writer(&mut buffer);
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
    }
    Ok(buffer)
}

pub fn export_capital_gains_csv(
    transactions: &[CapitalGainTransaction],
) -> anyhow::Result<Vec<u8>> {
    export_rows(transactions.iter().map(CapitalGainExportRow::from).collect())
}

pub fn export_dividends_csv(transactions: &[DividendTransaction]) -> anyhow::Result<Vec<u8>> {
    export_rows(transactions.iter().map(DividendExportRow::from).collect())
}

pub fn export_interest_csv(transactions: &[InterestTransaction]) -> anyhow::Result<Vec<u8>> {
    export_rows(transactions.iter().map(InterestExportRow::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn transaction() -> CapitalGainTransaction {
        CapitalGainTransaction {
            id: 0,
            symbol: "AAPL".to_string(),
            quantity: dec!(10),
            date_acquired: None,
            date_sold: NaiveDate::from_ymd_opt(2023, 3, 4).unwrap(),
            proceeds_usd: dec!(1500.00),
            cost_usd: dec!(1000.00),
            wash_sale_loss_usd: dec!(0),
            acquisition_rate: dec!(140.0),
            sale_rate: dec!(140.0),
            proceeds_jpy: 210000,
            cost_jpy: 140000,
            gain_loss_jpy: 70000,
            is_wash_sale: false,
            note: Some("Acquired on various dates".to_string()),
        }
    }

    #[test]
    fn export_starts_with_bom_and_header_row() {
        let bytes = export_capital_gains_csv(&[transaction()]).unwrap();
        assert!(bytes.starts_with(b"\xef\xbb\xbf"));
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Symbol,Quantity,Date Acquired,Date Sold"));
        assert!(header.contains("Gain/Loss (JPY)"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("AAPL,10,VARIOUS,2023-03-04"));
        assert!(row.contains("210000"));
    }

    #[test]
    fn dividend_export_mirrors_both_currencies() {
        let dividend = DividendTransaction {
            id: 0,
            symbol: "ACME".to_string(),
            date: NaiveDate::from_ymd_opt(2023, 6, 15).unwrap(),
            amount_net_usd: dec!(8.50),
            tax_usd: dec!(1.50),
            amount_gross_usd: dec!(10.00),
            rate: dec!(145.2),
            amount_gross_jpy: 1452,
            tax_jpy: 217,
            amount_net_jpy: 1234,
            description: "NON-RES TAX WITHHELD $1.50".to_string(),
        };
        let bytes = export_dividends_csv(&[dividend]).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.starts_with("Symbol,Date,Gross (USD)"));
        assert!(text.contains("ACME,2023-06-15,10.00,1.50,8.50,145.2,1452,217,1234"));
    }
}
