//! Rule-based trading signal backtester.
//!
//! Price series flow one way through the core: indicators
//! ([`domain::indicator`]), a per-row signal ([`domain::signal`]), a lagged
//! single-ticker simulation ([`domain::backtest`]) and a weighted portfolio
//! ([`domain::portfolio`]). Port traits in [`ports`] describe the price-data
//! and configuration collaborators; [`adapters`] holds file-based
//! implementations.

pub mod domain;
pub mod ports;
pub mod adapters;
