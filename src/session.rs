use chrono::{Datelike, Duration, NaiveDate, Utc};
use tracing::{debug, info};

use crate::error::ImportError;
use crate::models::capital_gain::CapitalGainTransaction;
use crate::models::dividend::DividendTransaction;
use crate::models::interest::InterestTransaction;
use crate::services::importers::gain_loss::{derive_capital_gains, GainLossRecord};
use crate::services::importers::history::{derive_dividends, derive_interest, HistoryRecord};
use crate::services::market_data::fx_rates::{
    fetch_usd_jpy_rates, RateTable, RATE_LOOKBACK_DAYS,
};
use crate::services::parsers::{parse_export, ParsedExport};
use crate::services::reports::{build_report, TaxReport};
use crate::services::taxation::available_years;
use crate::util::general_helpers::parse_flexible_date;

/// Session-scoped application state. Raw rows, the rate table and the three
/// derived collections are each replaced wholesale; recalculation always
/// rebuilds every derived collection from scratch.
pub struct Session {
    gain_rows: Vec<GainLossRecord>,
    dividend_rows: Vec<HistoryRecord>,
    interest_rows: Vec<HistoryRecord>,
    rates: RateTable,
    capital_gains: Vec<CapitalGainTransaction>,
    dividends: Vec<DividendTransaction>,
    interest: Vec<InterestTransaction>,
    selected_year: i32,
    fetch_generation: u64,
    fetch_in_flight: bool,
}

impl Session {
    pub fn new() -> Self {
        Session {
            gain_rows: Vec::new(),
            dividend_rows: Vec::new(),
            interest_rows: Vec::new(),
            rates: RateTable::new(),
            capital_gains: Vec::new(),
            dividends: Vec::new(),
            interest: Vec::new(),
            selected_year: Utc::now().year(),
            fetch_generation: 0,
            fetch_in_flight: false,
        }
    }

    /// Classifies an uploaded file and replaces the matching raw collection.
    /// A gain/loss file leaves history rows alone and vice versa.
    pub fn load_export(&mut self, text: &str) -> Result<(), ImportError> {
        match parse_export(text)? {
            ParsedExport::GainLoss(rows) => {
                info!(rows = rows.len(), "loaded gain/loss export");
                self.gain_rows = rows;
            }
            ParsedExport::History { dividends, interest } => {
                info!(
                    dividends = dividends.len(),
                    interest = interest.len(),
                    "loaded history export"
                );
                self.dividend_rows = dividends;
                self.interest_rows = interest;
            }
        }
        self.recalculate();
        Ok(())
    }

    /// The inclusive provider request range: every date the loaded rows
    /// mention, padded backward so the resolver's fallback window has data.
    pub fn fetch_bounds(&self) -> Result<(NaiveDate, NaiveDate), ImportError> {
        let mut dates: Vec<NaiveDate> = Vec::new();
        for row in &self.gain_rows {
            dates.extend(parse_flexible_date(&row.date_sold));
            dates.extend(parse_flexible_date(&row.date_acquired));
        }
        for row in self.dividend_rows.iter().chain(&self.interest_rows) {
            dates.extend(parse_flexible_date(&row.trade_date));
        }

        let earliest = *dates.iter().min().ok_or(ImportError::NoDatesForRates)?;
        let latest = *dates.iter().max().ok_or(ImportError::NoDatesForRates)?;
        Ok((earliest - Duration::days(RATE_LOOKBACK_DAYS), latest))
    }

    /// Starts a fetch unless one is already outstanding. The returned
    /// generation must be handed back with the result so a superseded
    /// response can be told apart from the current one.
    pub fn begin_rate_fetch(&mut self) -> Option<u64> {
        if self.fetch_in_flight {
            debug!("rate fetch already in flight");
            return None;
        }
        self.fetch_in_flight = true;
        self.fetch_generation += 1;
        Some(self.fetch_generation)
    }

    /// Installs a fetched rate table and recalculates. A stale generation
    /// is discarded so a late response can't clobber newer state.
    pub fn apply_rates(&mut self, generation: u64, rates: RateTable) -> bool {
        if generation != self.fetch_generation {
            debug!(
                generation,
                current = self.fetch_generation,
                "discarding superseded rate fetch"
            );
            return false;
        }
        self.fetch_in_flight = false;
        self.rates = rates;
        self.recalculate();
        self.selected_year = self
            .available_years()
            .into_iter()
            .next()
            .unwrap_or_else(|| Utc::now().year());
        true
    }

    /// Clears the busy flag after a failed fetch without touching state.
    pub fn finish_rate_fetch(&mut self, generation: u64) {
        if generation == self.fetch_generation {
            self.fetch_in_flight = false;
        }
    }

    /// One-call fetch for single-threaded callers; the generation plumbing
    /// is still exercised so a manual begin/apply cycle behaves the same.
    pub async fn fetch_rates(&mut self) -> Result<(), ImportError> {
        let (start, end) = self.fetch_bounds()?;
        let Some(generation) = self.begin_rate_fetch() else {
            return Ok(());
        };
        match fetch_usd_jpy_rates(start, end).await {
            Ok(table) => {
                self.apply_rates(generation, table);
                Ok(())
            }
            Err(e) => {
                self.finish_rate_fetch(generation);
                Err(ImportError::RateFetch(e.to_string()))
            }
        }
    }

    pub fn select_year(&mut self, year: i32) {
        self.selected_year = year;
    }

    pub fn selected_year(&self) -> i32 {
        self.selected_year
    }

    pub fn available_years(&self) -> Vec<i32> {
        available_years(&self.capital_gains, &self.dividends, &self.interest)
    }

    pub fn report(&self) -> TaxReport {
        build_report(
            self.selected_year,
            &self.capital_gains,
            &self.dividends,
            &self.interest,
        )
    }

    pub fn capital_gains(&self) -> &[CapitalGainTransaction] {
        &self.capital_gains
    }

    pub fn dividends(&self) -> &[DividendTransaction] {
        &self.dividends
    }

    pub fn interest(&self) -> &[InterestTransaction] {
        &self.interest
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    fn recalculate(&mut self) {
        self.capital_gains = derive_capital_gains(&self.gain_rows, &self.rates);
        self.dividends = derive_dividends(&self.dividend_rows, &self.rates);
        self.interest = derive_interest(&self.interest_rows, &self.rates);
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}
