//! Single-instrument backtest.
//!
//! Signals are classified per indicator row, mapped to an exposure and applied
//! one period later: the position held on a date is the exposure signalled on
//! the previous date, and the first date is always flat. Cost is charged on
//! every change in position in proportion to its size.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::indicator::{compute_indicators, IndicatorParams};
use crate::domain::metrics::{equity_curve, EquityCurve, Metrics, ReturnSeries, SeriesPoint};
use crate::domain::price::PriceSeries;
use crate::domain::signal::{classify, Signal, SignalThresholds};

const BPS_PER_UNIT: f64 = 10_000.0;

/// Indicator windows and signal thresholds shared by every ticker in a run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrategyParams {
    pub ma_short: usize,
    pub ma_long: usize,
    pub rsi_period: usize,
    pub rsi_buy: f64,
    pub rsi_sell: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        let indicators = IndicatorParams::default();
        let thresholds = SignalThresholds::default();
        StrategyParams {
            ma_short: indicators.ma_short,
            ma_long: indicators.ma_long,
            rsi_period: indicators.rsi_period,
            rsi_buy: thresholds.rsi_buy,
            rsi_sell: thresholds.rsi_sell,
        }
    }
}

impl StrategyParams {
    pub fn indicator_params(&self) -> IndicatorParams {
        IndicatorParams {
            ma_short: self.ma_short,
            ma_long: self.ma_long,
            rsi_period: self.rsi_period,
        }
    }

    pub fn thresholds(&self) -> SignalThresholds {
        SignalThresholds {
            rsi_buy: self.rsi_buy,
            rsi_sell: self.rsi_sell,
        }
    }
}

/// One simulated period.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BacktestPeriod {
    pub date: NaiveDate,
    pub close: f64,
    /// Signal computed from this period's indicators; acted on next period.
    pub signal: Signal,
    /// Exposure held during this period.
    pub position: f64,
    pub price_return: f64,
    pub gross_return: f64,
    pub cost: f64,
    pub net_return: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BacktestResult {
    pub ticker: String,
    pub periods: Vec<BacktestPeriod>,
    pub returns: ReturnSeries,
    pub equity: EquityCurve,
    pub metrics: Metrics,
}

impl BacktestResult {
    pub fn empty(ticker: impl Into<String>) -> Self {
        BacktestResult {
            ticker: ticker.into(),
            periods: Vec::new(),
            returns: Vec::new(),
            equity: Vec::new(),
            metrics: Metrics::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn positions(&self) -> Vec<SeriesPoint> {
        self.periods
            .iter()
            .map(|p| SeriesPoint::new(p.date, p.position))
            .collect()
    }

    pub fn signals(&self) -> Vec<(NaiveDate, Signal)> {
        self.periods.iter().map(|p| (p.date, p.signal)).collect()
    }

    pub fn latest(&self) -> Option<&BacktestPeriod> {
        self.periods.last()
    }

    /// Sum of transaction costs over the run.
    pub fn total_cost(&self) -> f64 {
        self.periods.iter().map(|p| p.cost).sum()
    }

    /// Number of periods where the position changed.
    pub fn position_changes(&self) -> usize {
        self.periods
            .windows(2)
            .filter(|w| w[1].position != w[0].position)
            .count()
    }
}

pub fn run_backtest(series: &PriceSeries, params: &StrategyParams, cost_bps: u32) -> BacktestResult {
    let rows = compute_indicators(series, &params.indicator_params());
    if rows.is_empty() {
        debug!(
            ticker = %series.ticker,
            bars = series.len(),
            "not enough history for a complete indicator row"
        );
        return BacktestResult::empty(series.ticker.clone());
    }

    let thresholds = params.thresholds();
    let cost_rate = f64::from(cost_bps) / BPS_PER_UNIT;

    let mut periods = Vec::with_capacity(rows.len());
    let mut prev_close: Option<f64> = None;
    let mut prev_exposure = 0.0;
    let mut prev_position = 0.0;

    for row in &rows {
        let signal = classify(row, &thresholds);
        let position = prev_exposure;

        let price_return = match prev_close {
            Some(prev) => row.close / prev - 1.0,
            None => 0.0,
        };
        let gross_return = position * price_return;
        let cost = (position - prev_position).abs() * cost_rate;

        periods.push(BacktestPeriod {
            date: row.date,
            close: row.close,
            signal,
            position,
            price_return,
            gross_return,
            cost,
            net_return: gross_return - cost,
        });

        prev_close = Some(row.close);
        prev_exposure = signal.exposure();
        prev_position = position;
    }

    let returns: ReturnSeries = periods
        .iter()
        .map(|p| SeriesPoint::new(p.date, p.net_return))
        .collect();
    let equity = equity_curve(&returns);
    let metrics = Metrics::from_returns(&returns);

    debug!(
        ticker = %series.ticker,
        periods = periods.len(),
        final_equity = equity.last().map(|p| p.value),
        "backtest complete"
    );

    BacktestResult {
        ticker: series.ticker.clone(),
        periods,
        returns,
        equity,
        metrics,
    }
}
