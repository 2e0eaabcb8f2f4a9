//! Weighted multi-ticker portfolio built from independent backtests.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, warn};

use super::backtest::{run_backtest, BacktestResult, StrategyParams};
use super::error::SignalTraderError;
use super::metrics::{equity_curve, EquityCurve, Metrics, ReturnSeries, SeriesPoint};
use super::price::PriceSeries;
use super::universe::normalize_ticker;

/// Sums within this distance of 1.0 are used as given.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Non-negative weight per ticker. Absent tickers weigh 0.0.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioWeights {
    weights: BTreeMap<String, f64>,
}

impl PortfolioWeights {
    pub fn new(weights: BTreeMap<String, f64>) -> Result<Self, SignalTraderError> {
        for (ticker, &w) in &weights {
            if !w.is_finite() || w < 0.0 {
                return Err(SignalTraderError::InvalidWeights {
                    reason: format!("weight for {ticker} must be a non-negative number, got {w}"),
                });
            }
        }
        if !weights.is_empty() && weights.values().sum::<f64>() <= 0.0 {
            return Err(SignalTraderError::InvalidWeights {
                reason: "weights sum to zero".to_string(),
            });
        }
        Ok(PortfolioWeights { weights })
    }

    pub fn equal<I, S>(tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tickers: Vec<String> = tickers.into_iter().map(Into::into).collect();
        let w = if tickers.is_empty() {
            0.0
        } else {
            1.0 / tickers.len() as f64
        };
        PortfolioWeights {
            weights: tickers.into_iter().map(|t| (t, w)).collect(),
        }
    }

    pub fn weight(&self, ticker: &str) -> f64 {
        self.weights.get(ticker).copied().unwrap_or(0.0)
    }

    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(t, &w)| (t.as_str(), w))
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    /// Proportionally rescaled so the weights sum to 1.0.
    ///
    /// Weights are divided by the largest one before summing, so a set of
    /// huge but finite weights cannot overflow the total.
    pub fn normalized(&self) -> Self {
        let largest = self.weights.values().copied().fold(0.0_f64, f64::max);
        if largest <= 0.0 {
            return self.clone();
        }
        let total = self.sum();
        if (total - 1.0).abs() <= WEIGHT_SUM_TOLERANCE {
            return self.clone();
        }
        warn!(total, "portfolio weights do not sum to 1.0, rescaling");

        let scaled_total: f64 = self.weights.values().map(|w| w / largest).sum();
        PortfolioWeights {
            weights: self
                .weights
                .iter()
                .map(|(t, &w)| (t.clone(), w / largest / scaled_total))
                .collect(),
        }
    }
}

/// Parses `TICKER=weight` pairs separated by commas, e.g. `ASML.AS=0.6,MSFT=0.4`.
/// Tickers are upper-cased; blank entries are ignored.
pub fn parse_weights(input: &str) -> Result<PortfolioWeights, SignalTraderError> {
    let mut weights = BTreeMap::new();

    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let Some((ticker, value)) = token.split_once('=') else {
            return Err(SignalTraderError::InvalidWeights {
                reason: format!("expected TICKER=weight, got '{token}'"),
            });
        };
        let Some(ticker) = normalize_ticker(ticker) else {
            return Err(SignalTraderError::InvalidWeights {
                reason: format!("missing ticker in '{token}'"),
            });
        };
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| SignalTraderError::InvalidWeights {
                reason: format!("invalid weight for {ticker}: '{}'", value.trim()),
            })?;
        if weights.insert(ticker.clone(), value).is_some() {
            return Err(SignalTraderError::InvalidWeights {
                reason: format!("duplicate ticker: {ticker}"),
            });
        }
    }

    PortfolioWeights::new(weights)
}

/// Aligns return series on the union of their dates and takes the weighted
/// sum per date. A ticker without a return on some date counts as 0.0 there.
/// Weights are applied as given; normalise beforehand if needed.
pub fn aggregate_returns<'a, I>(series: I, weights: &PortfolioWeights) -> ReturnSeries
where
    I: IntoIterator<Item = (&'a str, &'a [SeriesPoint])>,
{
    let series: Vec<(&str, BTreeMap<NaiveDate, f64>)> = series
        .into_iter()
        .map(|(ticker, points)| {
            (
                ticker,
                points.iter().map(|p| (p.date, p.value)).collect(),
            )
        })
        .collect();

    let timeline: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|(_, by_date)| by_date.keys().copied())
        .collect();

    timeline
        .into_iter()
        .map(|date| {
            let value = series
                .iter()
                .map(|(ticker, by_date)| {
                    weights.weight(ticker) * by_date.get(&date).copied().unwrap_or(0.0)
                })
                .sum();
            SeriesPoint::new(date, value)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioResult {
    pub per_ticker: BTreeMap<String, BacktestResult>,
    /// Effective weights after defaulting and normalisation.
    pub weights: PortfolioWeights,
    pub returns: ReturnSeries,
    pub equity: EquityCurve,
    pub metrics: Metrics,
}

impl PortfolioResult {
    pub fn empty() -> Self {
        PortfolioResult {
            per_ticker: BTreeMap::new(),
            weights: PortfolioWeights::default(),
            returns: Vec::new(),
            equity: Vec::new(),
            metrics: Metrics::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }
}

/// Backtests every ticker independently (in parallel) and combines the net
/// returns with `weights`, or equal weights when none are supplied.
pub fn run_portfolio(
    prices: &BTreeMap<String, PriceSeries>,
    params: &StrategyParams,
    weights: Option<&PortfolioWeights>,
    cost_bps: u32,
) -> PortfolioResult {
    if prices.is_empty() {
        return PortfolioResult::empty();
    }

    let weights = match weights {
        Some(w) if !w.is_empty() => w.normalized(),
        _ => PortfolioWeights::equal(prices.keys().cloned()),
    };

    let known: HashSet<&str> = prices.keys().map(String::as_str).collect();
    for ticker in weights.tickers().filter(|t| !known.contains(t)) {
        warn!(
            ticker,
            weight = weights.weight(ticker),
            "weighted ticker has no price series; its share stays in cash"
        );
    }

    let per_ticker: BTreeMap<String, BacktestResult> = prices
        .par_iter()
        .map(|(ticker, series)| (ticker.clone(), run_backtest(series, params, cost_bps)))
        .collect();

    let returns = aggregate_returns(
        per_ticker
            .iter()
            .map(|(ticker, result)| (ticker.as_str(), result.returns.as_slice())),
        &weights,
    );
    let equity = equity_curve(&returns);
    let metrics = Metrics::from_returns(&returns);

    debug!(
        tickers = per_ticker.len(),
        periods = returns.len(),
        "portfolio backtest complete"
    );

    PortfolioResult {
        per_ticker,
        weights,
        returns,
        equity,
        metrics,
    }
}
