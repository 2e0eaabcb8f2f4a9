//! Run configuration: loading and validation.
//!
//! Expected layout:
//!
//! ```ini
//! [signals]
//! ma_short = 20
//! ma_long = 50
//! rsi_period = 14
//! rsi_buy = 35
//! rsi_sell = 65
//!
//! [backtest]
//! tickers = ASML.AS,AAPL,MSFT
//! weights = ASML.AS=0.5,AAPL=0.25,MSFT=0.25
//! cost_bps = 5
//! start_date = 2020-01-01
//! end_date = 2024-12-31
//!
//! [sectors]
//! semiconductors = ASML.AS,NVDA
//! software = MSFT
//! ```
//!
//! Every `[signals]` key and `cost_bps` fall back to the defaults shown;
//! `weights` (equal weights) and `[sectors]` are optional. Sector names are
//! read lower-cased.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::warn;

use crate::domain::backtest::StrategyParams;
use crate::domain::error::SignalTraderError;
use crate::domain::portfolio::{parse_weights, PortfolioWeights};
use crate::domain::universe::parse_tickers;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_COST_BPS: u32 = 5;

const SIGNALS: &str = "signals";
const BACKTEST: &str = "backtest";
const SECTORS: &str = "sectors";

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub params: StrategyParams,
    pub cost_bps: u32,
    pub tickers: Vec<String>,
    pub weights: Option<PortfolioWeights>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Sector name to member tickers; empty when not configured.
    pub sectors: BTreeMap<String, Vec<String>>,
}

pub fn load_run_config(config: &dyn ConfigPort) -> Result<RunConfig, SignalTraderError> {
    let params = load_strategy_params(config)?;
    let cost_bps = load_cost_bps(config)?;
    let tickers = load_tickers(config)?;
    let weights = load_weights(config)?;
    let (start_date, end_date) = load_dates(config)?;
    let sectors = load_sectors(config)?;

    Ok(RunConfig {
        params,
        cost_bps,
        tickers,
        weights,
        start_date,
        end_date,
        sectors,
    })
}

pub fn load_strategy_params(config: &dyn ConfigPort) -> Result<StrategyParams, SignalTraderError> {
    let defaults = StrategyParams::default();
    let ma_short = load_window(config, "ma_short", defaults.ma_short)?;
    let ma_long = load_window(config, "ma_long", defaults.ma_long)?;
    let rsi_period = load_window(config, "rsi_period", defaults.rsi_period)?;

    if ma_short >= ma_long {
        warn!(ma_short, ma_long, "short moving average is not shorter than the long one");
    }

    let rsi_buy = double_or(config, SIGNALS, "rsi_buy", defaults.rsi_buy)?;
    let rsi_sell = double_or(config, SIGNALS, "rsi_sell", defaults.rsi_sell)?;
    if !(rsi_buy > 0.0 && rsi_buy < 100.0) {
        return Err(invalid(SIGNALS, "rsi_buy", "rsi_buy must be between 0 and 100"));
    }
    if !(rsi_sell > 0.0 && rsi_sell < 100.0) {
        return Err(invalid(SIGNALS, "rsi_sell", "rsi_sell must be between 0 and 100"));
    }
    if rsi_buy >= rsi_sell {
        return Err(invalid(SIGNALS, "rsi_buy", "rsi_buy must be below rsi_sell"));
    }

    Ok(StrategyParams {
        ma_short,
        ma_long,
        rsi_period,
        rsi_buy,
        rsi_sell,
    })
}

fn load_window(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, SignalTraderError> {
    let value = int_or(config, SIGNALS, key, default as i64)?;
    if value < 1 {
        return Err(invalid(SIGNALS, key, &format!("{key} must be at least 1")));
    }
    usize::try_from(value).map_err(|_| invalid(SIGNALS, key, &format!("{key} is too large")))
}

fn load_cost_bps(config: &dyn ConfigPort) -> Result<u32, SignalTraderError> {
    let value = int_or(config, BACKTEST, "cost_bps", i64::from(DEFAULT_COST_BPS))?;
    if value < 0 {
        return Err(invalid(BACKTEST, "cost_bps", "cost_bps must be non-negative"));
    }
    u32::try_from(value).map_err(|_| invalid(BACKTEST, "cost_bps", "cost_bps is too large"))
}

fn load_tickers(config: &dyn ConfigPort) -> Result<Vec<String>, SignalTraderError> {
    match config.get_string(BACKTEST, "tickers") {
        Some(s) if !s.trim().is_empty() => {
            parse_tickers(&s).map_err(|e| invalid(BACKTEST, "tickers", &e.to_string()))
        }
        _ => Err(SignalTraderError::ConfigMissing {
            section: BACKTEST.to_string(),
            key: "tickers".to_string(),
        }),
    }
}

fn load_weights(config: &dyn ConfigPort) -> Result<Option<PortfolioWeights>, SignalTraderError> {
    let Some(raw) = config.get_string(BACKTEST, "weights") else {
        return Ok(None);
    };
    let weights = parse_weights(&raw).map_err(|e| invalid(BACKTEST, "weights", &e.to_string()))?;
    Ok((!weights.is_empty()).then_some(weights))
}

fn load_dates(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), SignalTraderError> {
    let start = parse_date(config.get_string(BACKTEST, "start_date").as_deref(), "start_date")?;
    let end = parse_date(config.get_string(BACKTEST, "end_date").as_deref(), "end_date")?;
    if start >= end {
        return Err(invalid(BACKTEST, "start_date", "start_date must be before end_date"));
    }
    Ok((start, end))
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, SignalTraderError> {
    match value {
        None => Err(SignalTraderError::ConfigMissing {
            section: BACKTEST.to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                BACKTEST,
                field,
                &format!("invalid {field} format, expected YYYY-MM-DD"),
            )
        }),
    }
}

fn load_sectors(
    config: &dyn ConfigPort,
) -> Result<BTreeMap<String, Vec<String>>, SignalTraderError> {
    config
        .section_keys(SECTORS)
        .into_iter()
        .map(|sector| {
            let raw = config.get_string(SECTORS, &sector).unwrap_or_default();
            let tickers = parse_tickers(&raw)
                .map_err(|e| invalid(SECTORS, &sector, &e.to_string()))?;
            Ok((sector, tickers))
        })
        .collect()
}

fn int_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, SignalTraderError> {
    let value = config
        .get_int(section, key)
        .map_err(|reason| invalid(section, key, &reason))?;
    Ok(value.unwrap_or(default))
}

fn double_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, SignalTraderError> {
    let value = config
        .get_double(section, key)
        .map_err(|reason| invalid(section, key, &reason))?;
    Ok(value.unwrap_or(default))
}

fn invalid(section: &str, key: &str, reason: &str) -> SignalTraderError {
    SignalTraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
