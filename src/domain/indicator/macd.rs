//! MACD (Moving Average Convergence Divergence) with fixed 12/26/9 spans.
//!
//! MACD Line = EMA(12) - EMA(26) of close
//! Signal Line = EMA(9) of the MACD line
//!
//! The line is defined from bar 25, the signal from bar 33.

use super::ema::ema;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Bars needed before both the line and its signal are defined.
pub const MACD_MIN_HISTORY: usize = MACD_SLOW + MACD_SIGNAL - 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: f64,
}

impl MacdPoint {
    pub fn histogram(&self) -> f64 {
        self.line - self.signal
    }
}

pub fn macd(closes: &[f64]) -> Vec<Option<MacdPoint>> {
    let input: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    let fast = ema(&input, MACD_FAST);
    let slow = ema(&input, MACD_SLOW);

    let line: Vec<Option<f64>> = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = ema(&line, MACD_SIGNAL);

    line.iter()
        .zip(&signal)
        .map(|(l, s)| {
            Some(MacdPoint {
                line: (*l)?,
                signal: (*s)?,
            })
        })
        .collect()
}
