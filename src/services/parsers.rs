use std::io::Cursor;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::ImportError;
use crate::services::importers::gain_loss::GainLossRecord;
use crate::services::importers::history::HistoryRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSchema {
    GainLoss,
    History,
}

/// Raw rows of one uploaded file, already split per schema. History rows
/// are partitioned by action; buys, sells and transfers in the same export
/// are out of scope and dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedExport {
    GainLoss(Vec<GainLossRecord>),
    History {
        dividends: Vec<HistoryRecord>,
        interest: Vec<HistoryRecord>,
    },
}

pub fn parse_export(text: &str) -> Result<ParsedExport, ImportError> {
    let text = text.trim_start_matches('\u{feff}');
    if text.trim().is_empty() {
        return Err(ImportError::EmptyFile);
    }

    // export files carry disclaimer/account preamble lines above the table
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let header_index = lines
        .iter()
        .position(|line| is_header_line(line))
        .ok_or(ImportError::HeaderNotFound)?;

    let table = lines[header_index..].join("\n");
    let schema = match detect_schema_from_header(lines[header_index]) {
        Some(schema) => schema,
        None => detect_schema_from_fields(&table)?,
    };
    debug!(?schema, "classified export file");

    match schema {
        ExportSchema::GainLoss => {
            let rows = read_gain_loss_rows(&table)?;
            if rows.is_empty() {
                return Err(ImportError::NoRows);
            }
            Ok(ParsedExport::GainLoss(rows))
        }
        ExportSchema::History => {
            let (dividends, interest) = read_history_rows(&table)?;
            if dividends.is_empty() && interest.is_empty() {
                return Err(ImportError::NoRows);
            }
            Ok(ParsedExport::History { dividends, interest })
        }
    }
}

fn is_header_line(line: &str) -> bool {
    line.trim_start_matches(['"', '\''])
        .trim_start()
        .to_lowercase()
        .starts_with("symbol")
}

pub fn detect_schema_from_header(header_line: &str) -> Option<ExportSchema> {
    let header = header_line.to_lowercase();
    if header.contains("sales proceeds") {
        return Some(ExportSchema::GainLoss);
    }
    if header.contains("action") && header.contains("amount") {
        return Some(ExportSchema::History);
    }
    None
}

// recovery pass for headers the substring checks don't settle: the parsed
// field names themselves decide
fn detect_schema_from_fields(table: &str) -> Result<ExportSchema, ImportError> {
    let mut rdr = ReaderBuilder::new().from_reader(Cursor::new(table));
    let headers = rdr.headers().map_err(|e| ImportError::Csv(e.to_string()))?;
    if headers.iter().any(|field| field.trim() == "Sales Proceeds") {
        return Ok(ExportSchema::GainLoss);
    }
    if headers.iter().any(|field| field.trim() == "Action") {
        return Ok(ExportSchema::History);
    }
    Err(ImportError::UnrecognizedFormat)
}

fn read_gain_loss_rows(table: &str) -> Result<Vec<GainLossRecord>, ImportError> {
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(Cursor::new(table));

    let mut rows = Vec::new();
    for record in rdr.deserialize::<GainLossRecord>() {
        let record = record.map_err(|e| ImportError::Csv(e.to_string()))?;
        // exports append "Total ..." subtotal rows that are not transactions
        if record.symbol.is_empty() || record.symbol.starts_with("Total") {
            debug!(symbol = %record.symbol, "skipping subtotal row");
            continue;
        }
        rows.push(record);
    }
    Ok(rows)
}

fn read_history_rows(table: &str) -> Result<(Vec<HistoryRecord>, Vec<HistoryRecord>), ImportError> {
    let mut rdr = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(Cursor::new(table));

    let mut dividends = Vec::new();
    let mut interest = Vec::new();
    for record in rdr.deserialize::<HistoryRecord>() {
        let record = record.map_err(|e| ImportError::Csv(e.to_string()))?;
        match record.action.as_str() {
            "Dividend" => dividends.push(record),
            "Interest" => interest.push(record),
            other => debug!(action = %other, "ignoring out-of-scope action"),
        }
    }
    Ok((dividends, interest))
}
