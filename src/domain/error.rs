//! Domain error types.
//!
//! The computation core is infallible: short histories produce empty results
//! and degenerate statistics are reported as `None`. Errors only arise at the
//! collaborator boundary (configuration, price data, weight input).

use chrono::NaiveDate;

/// Top-level error type for signaltrader.
#[derive(Debug, thiserror::Error)]
pub enum SignalTraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid portfolio weights: {reason}")]
    InvalidWeights { reason: String },

    #[error("invalid price series for {ticker} at {date}: {reason}")]
    InvalidSeries {
        ticker: String,
        date: NaiveDate,
        reason: String,
    },

    #[error("no price data for {ticker}")]
    NoData { ticker: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
