#![allow(dead_code)]

use chrono::NaiveDate;
use signaltrader::domain::error::SignalTraderError;
pub use signaltrader::domain::price::{PriceBar, PriceSeries};
use signaltrader::ports::data_port::PriceDataPort;
use std::collections::{BTreeMap, HashMap};

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockDataPort {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SignalTraderError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(SignalTraderError::Data {
                reason: reason.clone(),
            });
        }
        let bars = self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        PriceSeries::validated(ticker, bars)
    }

    fn list_tickers(&self) -> Result<Vec<String>, SignalTraderError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One flat bar per consecutive calendar day from `start`.
pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar::flat(start + chrono::Duration::days(i as i64), close))
        .collect()
}

pub fn series_from_closes(ticker: &str, start: NaiveDate, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(ticker, bars_from_closes(start, closes))
}

/// Slow cycle with fast chop: enough structure for BUY and SELL rows.
pub fn choppy_closes(n: usize, phase: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 + phase;
            100.0 + 10.0 * (t / 20.0).sin() + 3.0 * (t * 1.7).sin() + 1.5 * (t * 0.9).cos()
        })
        .collect()
}

pub fn price_map(series: Vec<PriceSeries>) -> BTreeMap<String, PriceSeries> {
    series.into_iter().map(|s| (s.ticker.clone(), s)).collect()
}
