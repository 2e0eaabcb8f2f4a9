//! Technical indicators over closing prices.
//!
//! Each indicator function returns one `Option<f64>` per input close; `None`
//! marks a bar without enough trailing history. [`compute_indicators`] joins
//! them into [`IndicatorRow`]s and drops every bar where any indicator is
//! still undefined, so a row never carries a value computed on a short window.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use ema::ema;
pub use macd::{macd, MacdPoint, MACD_FAST, MACD_MIN_HISTORY, MACD_SIGNAL, MACD_SLOW};
pub use rsi::rsi;
pub use sma::sma;

use chrono::NaiveDate;

use crate::domain::price::PriceSeries;

/// Window lengths for the tunable indicators. MACD spans are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorParams {
    pub ma_short: usize,
    pub ma_long: usize,
    pub rsi_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        IndicatorParams {
            ma_short: 20,
            ma_long: 50,
            rsi_period: 14,
        }
    }
}

/// All indicator values for one bar.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub sma_short: f64,
    pub sma_long: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
}

/// Number of bars needed before the first complete row can exist.
pub fn min_history(params: &IndicatorParams) -> usize {
    params
        .ma_short
        .max(params.ma_long)
        .max(params.rsi_period + 1)
        .max(MACD_MIN_HISTORY)
}

pub fn compute_indicators(series: &PriceSeries, params: &IndicatorParams) -> Vec<IndicatorRow> {
    let closes = series.closes();
    let sma_short = sma(&closes, params.ma_short);
    let sma_long = sma(&closes, params.ma_long);
    let rsi_values = rsi(&closes, params.rsi_period);
    let macd_values = macd(&closes);

    series
        .bars
        .iter()
        .enumerate()
        .filter_map(|(i, bar)| {
            let (Some(s), Some(l), Some(r), Some(m)) =
                (sma_short[i], sma_long[i], rsi_values[i], macd_values[i])
            else {
                return None;
            };
            Some(IndicatorRow {
                date: bar.date,
                close: bar.close,
                sma_short: s,
                sma_long: l,
                rsi: r,
                macd: m.line,
                macd_signal: m.signal,
            })
        })
        .collect()
}
