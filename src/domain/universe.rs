//! Ticker universe: parsing ticker lists and fetching their price series.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::error::SignalTraderError;
use crate::domain::price::PriceSeries;
use crate::ports::data_port::PriceDataPort;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TickerListError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

/// Canonical form of a ticker symbol: trimmed and upper-cased, so `asml.as`
/// and ` ASML.AS ` name the same instrument. `None` for a blank symbol.
pub fn normalize_ticker(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_uppercase())
}

/// Comma-separated tickers in their canonical form, in input order.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, TickerListError> {
    let mut seen = HashSet::new();
    input
        .split(',')
        .map(|token| {
            let ticker = normalize_ticker(token).ok_or(TickerListError::EmptyToken)?;
            if seen.insert(ticker.clone()) {
                Ok(ticker)
            } else {
                Err(TickerListError::DuplicateTicker(ticker))
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    FetchFailed(String),
    NoData,
}

#[derive(Debug, Clone)]
pub struct UniverseFetch {
    pub prices: BTreeMap<String, PriceSeries>,
    pub skipped: Vec<SkippedTicker>,
}

/// Fetches every ticker; failures and empty series are skipped with a warning
/// so one bad ticker does not sink the run. A ticker the source has no data
/// for at all is recorded as `NoData`, same as an empty range. Short series
/// are kept: they simply produce no indicator rows downstream.
pub fn fetch_universe(
    data_port: &dyn PriceDataPort,
    tickers: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> UniverseFetch {
    let mut prices = BTreeMap::new();
    let mut skipped = Vec::new();

    for ticker in tickers {
        match data_port.fetch_prices(ticker, start_date, end_date) {
            Ok(series) if series.is_empty() => {
                warn!(ticker = %ticker, "skipping ticker: no data in range");
                skipped.push(SkippedTicker {
                    ticker: ticker.clone(),
                    reason: SkipReason::NoData,
                });
            }
            Ok(series) => {
                debug!(ticker = %ticker, bars = series.len(), "fetched price series");
                prices.insert(ticker.clone(), series);
            }
            Err(SignalTraderError::NoData { .. }) => {
                warn!(ticker = %ticker, "skipping ticker: no data source");
                skipped.push(SkippedTicker {
                    ticker: ticker.clone(),
                    reason: SkipReason::NoData,
                });
            }
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "skipping ticker: fetch failed");
                skipped.push(SkippedTicker {
                    ticker: ticker.clone(),
                    reason: SkipReason::FetchFailed(e.to_string()),
                });
            }
        }
    }

    UniverseFetch { prices, skipped }
}
