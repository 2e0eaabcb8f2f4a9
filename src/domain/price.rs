//! Price bars and per-ticker price series.

use chrono::NaiveDate;

use super::error::SignalTraderError;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    /// Bar with open = high = low = close.
    pub fn flat(date: NaiveDate, close: f64) -> Self {
        PriceBar {
            date,
            open: close,
            high: close,
            low: close,
            close,
        }
    }
}

/// Chronologically ordered bars for one ticker.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceSeries {
    pub ticker: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Wraps bars without checking them. Callers that did not produce the bars
    /// themselves should prefer [`PriceSeries::validated`].
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        PriceSeries {
            ticker: ticker.into(),
            bars,
        }
    }

    /// Dates must be strictly increasing and every close finite.
    pub fn validated(
        ticker: impl Into<String>,
        bars: Vec<PriceBar>,
    ) -> Result<Self, SignalTraderError> {
        let ticker = ticker.into();
        for (i, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() {
                return Err(SignalTraderError::InvalidSeries {
                    ticker,
                    date: bar.date,
                    reason: format!("close is not a finite number ({})", bar.close),
                });
            }
            if i > 0 {
                let prev = bars[i - 1].date;
                if bar.date == prev {
                    return Err(SignalTraderError::InvalidSeries {
                        ticker,
                        date: bar.date,
                        reason: "duplicate date".to_string(),
                    });
                }
                if bar.date < prev {
                    return Err(SignalTraderError::InvalidSeries {
                        ticker,
                        date: bar.date,
                        reason: format!("date precedes previous bar {prev}"),
                    });
                }
            }
        }
        Ok(PriceSeries { ticker, bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }
}
