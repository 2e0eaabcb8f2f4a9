//! Discrete trading signal derived from a single indicator row.
//!
//! Classification reads only the row it is given; no state carries across
//! rows.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::backtest::StrategyParams;
use crate::domain::indicator::{compute_indicators, IndicatorRow};
use crate::domain::price::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// Target exposure: long, short or flat.
    pub fn exposure(self) -> f64 {
        match self {
            Signal::Buy => 1.0,
            Signal::Sell => -1.0,
            Signal::Hold => 0.0,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// RSI gates: BUY requires `rsi < rsi_sell`, SELL requires `rsi > rsi_buy`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalThresholds {
    pub rsi_buy: f64,
    pub rsi_sell: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        SignalThresholds {
            rsi_buy: 35.0,
            rsi_sell: 65.0,
        }
    }
}

pub fn classify(row: &IndicatorRow, thresholds: &SignalThresholds) -> Signal {
    if row.sma_short > row.sma_long
        && row.rsi < thresholds.rsi_sell
        && row.macd > row.macd_signal
    {
        return Signal::Buy;
    }
    if row.sma_short < row.sma_long
        && row.rsi > thresholds.rsi_buy
        && row.macd < row.macd_signal
    {
        return Signal::Sell;
    }
    Signal::Hold
}

/// Latest indicator row and its signal for one ticker.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalSnapshot {
    pub ticker: String,
    pub signal: Signal,
    pub row: IndicatorRow,
}

/// Snapshot of the most recent signal per ticker. Tickers without a single
/// complete indicator row are left out.
pub fn latest_signals(
    prices: &BTreeMap<String, PriceSeries>,
    params: &StrategyParams,
) -> BTreeMap<String, SignalSnapshot> {
    let indicator_params = params.indicator_params();
    let thresholds = params.thresholds();

    prices
        .iter()
        .filter_map(|(ticker, series)| {
            let row = compute_indicators(series, &indicator_params).pop()?;
            let signal = classify(&row, &thresholds);
            Some((
                ticker.clone(),
                SignalSnapshot {
                    ticker: ticker.clone(),
                    signal,
                    row,
                },
            ))
        })
        .collect()
}
