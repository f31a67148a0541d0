use thiserror::Error;

/// Non-fatal import and rate errors, one user-facing message each.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("The file is empty.")]
    EmptyFile,

    #[error("Couldn't find a header row starting with \"Symbol\" anywhere in the file.")]
    HeaderNotFound,

    #[error("No transactions survived filtering. The file only contains subtotal or out-of-scope rows.")]
    NoRows,

    #[error("Unrecognized file layout. Expected a realized gain/loss export or a dividend & interest history export.")]
    UnrecognizedFormat,

    #[error("Couldn't read the file as delimited text: {0}")]
    Csv(String),

    #[error("No dated transactions to request exchange rates for. Load an export first.")]
    NoDatesForRates,

    #[error("Exchange rate request failed: {0}")]
    RateFetch(String),
}
