//! Core domain types and logic.

pub mod price;
pub mod indicator;
pub mod signal;
pub mod backtest;
pub mod metrics;
pub mod portfolio;
pub mod sector;
pub mod universe;
pub mod config;
pub mod error;
