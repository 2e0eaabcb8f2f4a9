//! Price data access port.

use crate::domain::error::SignalTraderError;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

pub trait PriceDataPort {
    /// Bars for `ticker` with `start_date <= date <= end_date`, oldest first.
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SignalTraderError>;

    fn list_tickers(&self) -> Result<Vec<String>, SignalTraderError>;
}
