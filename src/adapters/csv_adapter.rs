//! CSV price files, one `<TICKER>.csv` per ticker.
//!
//! Columns are located by header name (`date`, `open`, `high`, `low`, `close`,
//! case-insensitive); extra columns such as volume are ignored.

use crate::domain::error::SignalTraderError;
use crate::domain::metrics::SeriesPoint;
use crate::domain::price::{PriceBar, PriceSeries};
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, SignalTraderError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| SignalTraderError::Data {
                    reason: format!("missing {name} column"),
                })
        };
        Ok(Columns {
            date: find("date")?,
            open: find("open")?,
            high: find("high")?,
            low: find("low")?,
            close: find("close")?,
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{ticker}.csv"))
    }

    fn parse_bar(
        record: &csv::StringRecord,
        columns: &Columns,
    ) -> Result<PriceBar, SignalTraderError> {
        let date_str = field(record, columns.date, "date")?;
        let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|e| {
            SignalTraderError::Data {
                reason: format!("invalid date '{date_str}': {e}"),
            }
        })?;

        Ok(PriceBar {
            date,
            open: number(record, columns.open, "open")?,
            high: number(record, columns.high, "high")?,
            low: number(record, columns.low, "low")?,
            close: number(record, columns.close, "close")?,
        })
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'r str, SignalTraderError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| SignalTraderError::Data {
            reason: format!("missing {name} value"),
        })
}

fn number(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, SignalTraderError> {
    let raw = field(record, index, name)?;
    raw.parse().map_err(|e| SignalTraderError::Data {
        reason: format!("invalid {name} value '{raw}': {e}"),
    })
}

impl PriceDataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SignalTraderError> {
        let path = self.csv_path(ticker);
        if !path.exists() {
            return Err(SignalTraderError::NoData {
                ticker: ticker.to_string(),
            });
        }

        let mut rdr = csv::Reader::from_path(&path).map_err(|e| SignalTraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let headers = rdr.headers().map_err(|e| SignalTraderError::Data {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;
        let columns = Columns::from_headers(headers)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| SignalTraderError::Data {
                reason: format!("CSV parse error: {e}"),
            })?;
            let bar = Self::parse_bar(&record, &columns)?;
            if bar.date < start_date || bar.date > end_date {
                continue;
            }
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        PriceSeries::validated(ticker, bars)
    }

    fn list_tickers(&self) -> Result<Vec<String>, SignalTraderError> {
        let entries = fs::read_dir(&self.base_path)?;

        let mut tickers = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    tickers.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}

/// Writes a dated series as `date,<value_header>` rows.
pub fn write_series<P: AsRef<Path>>(
    path: P,
    value_header: &str,
    series: &[SeriesPoint],
) -> Result<(), SignalTraderError> {
    let mut wtr = csv::Writer::from_path(path.as_ref()).map_err(|e| SignalTraderError::Data {
        reason: format!("failed to create {}: {}", path.as_ref().display(), e),
    })?;
    let to_data_err = |e: csv::Error| SignalTraderError::Data {
        reason: format!("CSV write error: {e}"),
    };

    wtr.write_record(["date", value_header]).map_err(to_data_err)?;
    for point in series {
        wtr.write_record([
            point.date.format(DATE_FORMAT).to_string(),
            point.value.to_string(),
        ])
        .map_err(to_data_err)?;
    }
    wtr.flush()?;
    Ok(())
}
