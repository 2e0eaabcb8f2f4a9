//! Performance metrics over a net return series.
//!
//! Undefined statistics (empty series, zero variance, non-finite results) are
//! `None` rather than NaN.

use chrono::NaiveDate;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// A dated scalar: a period return or an equity level.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        SeriesPoint { date, value }
    }
}

/// Net fractional return per period.
pub type ReturnSeries = Vec<SeriesPoint>;

/// Compounded growth of 1.0.
pub type EquityCurve = Vec<SeriesPoint>;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metrics {
    pub cagr: Option<f64>,
    pub sharpe: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub hit_ratio: Option<f64>,
    pub total_return: Option<f64>,
}

impl Metrics {
    pub fn empty() -> Self {
        Metrics::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Metrics::empty()
    }

    pub fn from_returns(returns: &[SeriesPoint]) -> Self {
        if returns.is_empty() {
            return Metrics::empty();
        }

        let values: Vec<f64> = returns.iter().map(|p| p.value).collect();
        let equity = equity_curve(returns);
        let final_equity = equity.last().map(|p| p.value);

        Metrics {
            cagr: final_equity.and_then(|e| cagr(e, values.len())),
            sharpe: sharpe(&values),
            max_drawdown: max_drawdown(&equity),
            hit_ratio: hit_ratio(&values),
            total_return: final_equity.map(|e| e - 1.0).filter(|v| v.is_finite()),
        }
    }
}

/// Cumulative product of (1 + r), starting from 1.0.
pub fn equity_curve(returns: &[SeriesPoint]) -> EquityCurve {
    let mut level = 1.0;
    returns
        .iter()
        .map(|p| {
            level *= 1.0 + p.value;
            SeriesPoint::new(p.date, level)
        })
        .collect()
}

/// Minimum of equity / running peak - 1. Never positive.
pub fn max_drawdown(equity: &[SeriesPoint]) -> Option<f64> {
    let first = equity.first()?;
    let mut peak = first.value;
    let mut worst = 0.0_f64;

    for point in equity {
        if point.value > peak {
            peak = point.value;
        }
        if peak > 0.0 {
            let dd = point.value / peak - 1.0;
            if dd < worst {
                worst = dd;
            }
        }
    }

    Some(worst)
}

fn cagr(final_equity: f64, periods: usize) -> Option<f64> {
    let years = periods as f64 / TRADING_DAYS_PER_YEAR;
    if periods == 0 || years <= 0.0 {
        return None;
    }
    let value = final_equity.powf(1.0 / years) - 1.0;
    value.is_finite().then_some(value)
}

fn sharpe(returns: &[f64]) -> Option<f64> {
    let stdev = sample_stddev(returns)?;
    if stdev == 0.0 {
        return None;
    }
    let value = TRADING_DAYS_PER_YEAR.sqrt() * mean(returns)? / stdev;
    value.is_finite().then_some(value)
}

fn hit_ratio(returns: &[f64]) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }
    let hits = returns.iter().filter(|&&r| r > 0.0).count();
    Some(hits as f64 / returns.len() as f64)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with n-1 degrees of freedom; undefined below two points.
fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}
