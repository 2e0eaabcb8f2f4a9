//! Integration tests for the full pipeline:
//! - config → universe fetch → portfolio backtest with a mock data port
//! - the same pipeline over CSV files and an INI file on disk
//! - portfolio alignment, weighting and empty-input contracts

mod common;

use approx::assert_relative_eq;
use common::*;
use signaltrader::adapters::csv_adapter::{write_series, CsvAdapter};
use signaltrader::adapters::file_config_adapter::FileConfigAdapter;
use signaltrader::domain::backtest::{run_backtest, StrategyParams};
use signaltrader::domain::config::load_run_config;
use signaltrader::domain::metrics::{ReturnSeries, SeriesPoint};
use signaltrader::domain::portfolio::{
    aggregate_returns, parse_weights, run_portfolio, PortfolioWeights,
};
use signaltrader::domain::sector::sector_summary;
use signaltrader::domain::signal::{latest_signals, Signal};
use signaltrader::domain::universe::{fetch_universe, SkipReason};
use std::collections::BTreeMap;
use std::fs;

mod single_ticker {
    use super::*;

    #[test]
    fn constant_price_has_undefined_sharpe_and_zero_drawdown() {
        let series = series_from_closes("FLAT", date(2023, 1, 1), &[100.0; 300]);
        let result = run_backtest(&series, &StrategyParams::default(), 5);

        assert!(!result.is_empty());
        assert_eq!(result.metrics.sharpe, None);
        assert_eq!(result.metrics.max_drawdown, Some(0.0));
        assert_eq!(result.total_cost(), 0.0);
    }

    #[test]
    fn positions_lag_signals_by_one_period() {
        let series = series_from_closes("CHOP", date(2023, 1, 1), &choppy_closes(400, 0.0));
        let result = run_backtest(&series, &StrategyParams::default(), 5);

        let positions = result.positions();
        let signals = result.signals();
        assert_eq!(positions[0].value, 0.0);
        for d in 1..positions.len() {
            assert_eq!(positions[d].value, signals[d - 1].1.exposure());
            assert_eq!(positions[d].date, signals[d].0);
        }
    }

    #[test]
    fn flip_costs_twice_a_single_step() {
        let series = series_from_closes("CHOP", date(2023, 1, 1), &choppy_closes(400, 0.0));
        let result = run_backtest(&series, &StrategyParams::default(), 20);

        for w in result.periods.windows(2) {
            let step = (w[1].position - w[0].position).abs();
            if step == 2.0 {
                assert_relative_eq!(w[1].cost, 0.004, epsilon = 1e-15);
            } else if step == 1.0 {
                assert_relative_eq!(w[1].cost, 0.002, epsilon = 1e-15);
            } else {
                assert_eq!(w[1].cost, 0.0);
            }
        }
    }
}

mod portfolio {
    use super::*;

    fn returns(values: &[f64]) -> ReturnSeries {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| SeriesPoint::new(date(2024, 3, 1 + i as u32), v))
            .collect()
    }

    #[test]
    fn weighted_two_ticker_returns() {
        let a = returns(&[0.01, -0.02]);
        let b = returns(&[0.00, 0.03]);
        let weights = parse_weights("A=0.6,B=0.4").unwrap();

        let out = aggregate_returns(
            [("A", a.as_slice()), ("B", b.as_slice())],
            &weights.normalized(),
        );

        assert_eq!(out.len(), 2);
        assert_relative_eq!(out[0].value, 0.006, epsilon = 1e-12);
        assert_relative_eq!(out[1].value, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn weights_summing_to_four_are_halved() {
        let weights = parse_weights("A=2,B=2").unwrap().normalized();
        assert_relative_eq!(weights.weight("A"), 0.5);
        assert_relative_eq!(weights.weight("B"), 0.5);
    }

    #[test]
    fn default_weights_are_equal() {
        let prices = price_map(vec![
            series_from_closes("A", date(2023, 1, 1), &choppy_closes(200, 0.0)),
            series_from_closes("B", date(2023, 1, 1), &choppy_closes(200, 37.0)),
        ]);

        let result = run_portfolio(&prices, &StrategyParams::default(), None, 5);

        assert_eq!(result.weights, PortfolioWeights::equal(["A", "B"]));
        let a = &result.per_ticker["A"].returns;
        let b = &result.per_ticker["B"].returns;
        for ((p, ra), rb) in result.returns.iter().zip(a).zip(b) {
            assert_relative_eq!(p.value, 0.5 * ra.value + 0.5 * rb.value, epsilon = 1e-15);
        }
    }

    #[test]
    fn later_listing_is_flat_before_its_first_row() {
        let prices = price_map(vec![
            series_from_closes("OLD", date(2023, 1, 1), &choppy_closes(200, 0.0)),
            series_from_closes("NEW", date(2023, 3, 1), &choppy_closes(141, 11.0)),
        ]);
        let weights = parse_weights("OLD=1,NEW=1").unwrap();

        let result = run_portfolio(&prices, &StrategyParams::default(), Some(&weights), 5);

        let old = &result.per_ticker["OLD"];
        let new = &result.per_ticker["NEW"];
        assert_eq!(result.returns.len(), old.returns.len());
        assert!(new.returns.len() < old.returns.len());

        let first_new = new.returns[0].date;
        for point in result.returns.iter().filter(|p| p.date < first_new) {
            let old_ret = old.returns.iter().find(|r| r.date == point.date).unwrap();
            assert_relative_eq!(point.value, 0.5 * old_ret.value, epsilon = 1e-15);
        }
    }

    #[test]
    fn weight_for_missing_ticker_stays_in_cash() {
        let prices = price_map(vec![series_from_closes(
            "A",
            date(2023, 1, 1),
            &choppy_closes(200, 0.0),
        )]);
        let weights = parse_weights("A=0.5,TYPO=0.5").unwrap();

        let result = run_portfolio(&prices, &StrategyParams::default(), Some(&weights), 5);

        let a = &result.per_ticker["A"].returns;
        for (p, ra) in result.returns.iter().zip(a) {
            assert_relative_eq!(p.value, 0.5 * ra.value, epsilon = 1e-15);
        }
    }

    #[test]
    fn ticker_without_history_contributes_nothing() {
        let prices = price_map(vec![
            series_from_closes("A", date(2023, 1, 1), &choppy_closes(200, 0.0)),
            series_from_closes("SHORT", date(2023, 1, 1), &choppy_closes(20, 0.0)),
        ]);

        let result = run_portfolio(&prices, &StrategyParams::default(), None, 5);

        assert!(result.per_ticker["SHORT"].is_empty());
        let a = &result.per_ticker["A"].returns;
        assert_eq!(result.returns.len(), a.len());
        for (p, ra) in result.returns.iter().zip(a) {
            assert_relative_eq!(p.value, 0.5 * ra.value, epsilon = 1e-15);
        }
    }

    #[test]
    fn portfolio_equity_and_metrics_follow_returns() {
        let prices = price_map(vec![
            series_from_closes("A", date(2023, 1, 1), &choppy_closes(300, 0.0)),
            series_from_closes("B", date(2023, 1, 1), &choppy_closes(300, 23.0)),
        ]);

        let result = run_portfolio(&prices, &StrategyParams::default(), None, 5);

        assert_eq!(result.equity.len(), result.returns.len());
        let mut level = 1.0;
        for (e, r) in result.equity.iter().zip(&result.returns) {
            level *= 1.0 + r.value;
            assert_relative_eq!(e.value, level, epsilon = 1e-12);
        }
        assert!(result.metrics.max_drawdown.unwrap() <= 0.0);
        assert!(result.metrics.hit_ratio.is_some());
        assert!(result.metrics.cagr.is_some());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let prices = price_map(
            (0..6)
                .map(|i| {
                    series_from_closes(
                        &format!("T{i}"),
                        date(2023, 1, 1),
                        &choppy_closes(250, i as f64 * 13.0),
                    )
                })
                .collect(),
        );

        let first = run_portfolio(&prices, &StrategyParams::default(), None, 5);
        let second = run_portfolio(&prices, &StrategyParams::default(), None, 5);
        assert_eq!(first, second);
    }

    #[test]
    fn no_tickers_is_empty() {
        let weights = parse_weights("A=1").unwrap();
        let result = run_portfolio(&BTreeMap::new(), &StrategyParams::default(), Some(&weights), 5);
        assert!(result.is_empty());
        assert!(result.per_ticker.is_empty());
        assert!(result.metrics.is_empty());
    }
}

mod pipeline {
    use super::*;

    const CONFIG: &str = r#"
[signals]
ma_short = 20
ma_long = 50
rsi_period = 14
rsi_buy = 35
rsi_sell = 65

[backtest]
tickers = AAA, BBB, BROKEN, GONE
weights = AAA=3, BBB=1
cost_bps = 5
start_date = 2023-01-01
end_date = 2023-12-31

[sectors]
alpha = AAA, GONE
beta = BBB
"#;

    #[test]
    fn config_to_portfolio_with_mock_port() {
        let config = FileConfigAdapter::from_string(CONFIG).unwrap();
        let run = load_run_config(&config).unwrap();

        let port = MockDataPort::new()
            .with_bars("AAA", bars_from_closes(date(2023, 1, 1), &choppy_closes(400, 0.0)))
            .with_bars("BBB", bars_from_closes(date(2023, 1, 1), &choppy_closes(400, 29.0)))
            .with_bars("GONE", bars_from_closes(date(2022, 1, 1), &choppy_closes(100, 0.0)))
            .with_error("BROKEN", "provider timeout");

        let fetched = fetch_universe(&port, &run.tickers, run.start_date, run.end_date);

        assert_eq!(fetched.prices.len(), 2);
        assert_eq!(fetched.skipped.len(), 2);
        assert!(fetched
            .skipped
            .iter()
            .any(|s| s.ticker == "BROKEN" && matches!(&s.reason, SkipReason::FetchFailed(r) if r.contains("provider timeout"))));
        assert!(fetched
            .skipped
            .iter()
            .any(|s| s.ticker == "GONE" && s.reason == SkipReason::NoData));

        // Data ends at 2023-12-31 inside the configured window.
        assert_eq!(fetched.prices["AAA"].len(), 365);

        let result = run_portfolio(&fetched.prices, &run.params, run.weights.as_ref(), run.cost_bps);

        assert_relative_eq!(result.weights.weight("AAA"), 0.75);
        assert_relative_eq!(result.weights.weight("BBB"), 0.25);
        assert_eq!(result.per_ticker.len(), 2);
        assert_eq!(result.returns.len(), 365 - 50 + 1);

        let snapshots = latest_signals(&fetched.prices, &run.params);
        assert_eq!(snapshots.len(), 2);
        let latest_aaa = result.per_ticker["AAA"].latest().unwrap();
        assert_eq!(snapshots["AAA"].signal, latest_aaa.signal);
        assert_eq!(snapshots["AAA"].row.date, latest_aaa.date);

        let sectors = sector_summary(&run.sectors, &fetched.prices);
        assert_eq!(sectors.len(), 2);
        assert_eq!(sectors[0].sector, "alpha");
        assert_eq!(sectors[0].tickers, vec!["AAA"]);
        assert_relative_eq!(sectors[0].avg_price, fetched.prices["AAA"].last_close().unwrap());
        assert_eq!(sectors[1].count, 1);
    }

    #[test]
    fn csv_and_ini_files_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let data_dir = dir.path().join("prices");
        fs::create_dir(&data_dir).unwrap();

        for (ticker, phase) in [("ASML.AS", 0.0), ("MSFT", 17.0)] {
            let mut csv = String::from("Date,Open,High,Low,Close,Volume\n");
            for bar in bars_from_closes(date(2023, 1, 1), &choppy_closes(120, phase)) {
                csv.push_str(&format!(
                    "{},{},{},{},{},1000\n",
                    bar.date, bar.open, bar.high, bar.low, bar.close
                ));
            }
            fs::write(data_dir.join(format!("{ticker}.csv")), csv).unwrap();
        }

        let ini_path = dir.path().join("run.ini");
        fs::write(
            &ini_path,
            "[backtest]\ntickers = asml.as,msft\nstart_date = 2023-01-01\nend_date = 2023-12-31\n",
        )
        .unwrap();

        let config = FileConfigAdapter::from_file(&ini_path).unwrap();
        let run = load_run_config(&config).unwrap();
        let adapter = CsvAdapter::new(data_dir);

        let fetched = fetch_universe(&adapter, &run.tickers, run.start_date, run.end_date);
        assert!(fetched.skipped.is_empty());

        let result = run_portfolio(&fetched.prices, &run.params, run.weights.as_ref(), run.cost_bps);
        assert_eq!(result.returns.len(), 120 - 50 + 1);

        let out = dir.path().join("portfolio_equity.csv");
        write_series(&out, "equity", &result.equity).unwrap();
        let written = fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("date,equity\n2023-02-19,"));
        assert_eq!(written.lines().count(), result.equity.len() + 1);
    }

    #[test]
    fn hold_only_universe_stays_flat() {
        let prices = price_map(vec![series_from_closes(
            "FLAT",
            date(2023, 1, 1),
            &[50.0; 120],
        )]);
        let result = run_portfolio(&prices, &StrategyParams::default(), None, 5);

        assert!(result.per_ticker["FLAT"]
            .periods
            .iter()
            .all(|p| p.signal == Signal::Hold));
        assert!(result.equity.iter().all(|p| p.value == 1.0));
    }
}
