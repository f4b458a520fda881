//! Integration tests for the normalize → simulate → summarize pipeline.
//!
//! Tests cover:
//! - Multi-operator merge with known per-trade pnl checked step by step
//! - Missing-strategy policy behavior (skip vs fail)
//! - End-to-end runs over CSV fixtures on disk
//! - Purity and shape properties of the simulator (proptest)

mod common;

use approx::assert_relative_eq;
use common::*;
use titansim::domain::error::TitansimError;
use titansim::domain::simulation::{simulate, MissingStrategyPolicy};
use titansim::domain::strategy::StrategyBook;
use titansim::domain::summary::SimulationSummary;
use titansim::domain::trade::{filter_by_date, merge_trades};
use titansim::ports::trade_port::TradePort;

mod simulation_pipeline {
    use super::*;

    #[test]
    fn multi_operator_merge_and_compound() {
        let port = MockTradePort::new()
            .with_trades(
                "NATE",
                vec![make_trade("NATE", "2025-01-02", "09:30", 2.0)],
            )
            .with_trades(
                "REY",
                vec![make_trade("REY", "2025-01-02", "08:00", 1.0)],
            )
            .with_trades(
                "DAVID",
                vec![make_trade("DAVID", "2025-01-03", "10:00", 0.5)],
            );

        let mut batches = Vec::new();
        for operator in ["NATE", "REY", "DAVID"] {
            batches.push(
                port.fetch_trades(operator, "XAUUSD", date(2025, 1, 1), date(2025, 1, 31))
                    .unwrap(),
            );
        }
        let trades = merge_trades(batches);

        assert_eq!(trades.len(), 3);
        assert_eq!(trades[0].operator, "REY");
        assert_eq!(trades[1].operator, "NATE");
        assert_eq!(trades[2].operator, "DAVID");

        let trajectory =
            simulate(&trades, &default_book(), 10_000.0, MissingStrategyPolicy::Skip).unwrap();

        // REY rr=1: +1%*1*0.3 on 10000, then stop on the open 0.7 → -40
        assert_relative_eq!(trajectory[1], 9_960.0, max_relative = 1e-12);
        // NATE rr=2: +1%*(1*0.5 + 2*0.5) of 9960 → +149.4
        assert_relative_eq!(trajectory[2], 10_109.4, max_relative = 1e-12);
        // DAVID rr=0.5: full stop, -1% of 10109.4
        assert_relative_eq!(trajectory[3], 10_008.306, max_relative = 1e-12);

        let summary = SimulationSummary::compute(&trajectory, &trades);
        assert_relative_eq!(summary.final_balance, 10_008.306, max_relative = 1e-12);
        assert_relative_eq!(summary.peak_balance, 10_109.4, max_relative = 1e-12);
        assert_relative_eq!(summary.trough_balance, 9_960.0, max_relative = 1e-12);
        assert_eq!(
            summary.trades_by_operator,
            vec![
                ("DAVID".to_string(), 1),
                ("NATE".to_string(), 1),
                ("REY".to_string(), 1)
            ]
        );
    }

    #[test]
    fn win_then_stop_compounds() {
        let trades = vec![
            make_trade("NATE", "2025-01-02", "09:30", 2.0),
            make_trade("NATE", "2025-01-03", "09:30", 0.5),
        ];
        let trajectory =
            simulate(&trades, &default_book(), 10_000.0, MissingStrategyPolicy::Skip).unwrap();

        assert_eq!(trajectory.len(), 3);
        assert_relative_eq!(trajectory[1], 10_150.0, max_relative = 1e-12);
        assert_relative_eq!(trajectory[2], 10_048.5, max_relative = 1e-12);
    }

    #[test]
    fn date_filter_produces_degenerate_run() {
        let trades = vec![make_trade("NATE", "2025-03-15", "09:30", 2.0)];
        let filtered = filter_by_date(trades, date(2025, 1, 1), date(2025, 1, 31));
        let trajectory = simulate(
            &filtered,
            &default_book(),
            10_000.0,
            MissingStrategyPolicy::Skip,
        )
        .unwrap();
        assert_eq!(trajectory, vec![10_000.0]);
    }

    #[test]
    fn port_error_surfaces() {
        let port = MockTradePort::new().with_error("NATE", "disk on fire");
        let result = port.fetch_trades("NATE", "XAUUSD", date(2025, 1, 1), date(2025, 1, 31));
        assert!(matches!(result, Err(TitansimError::Data { .. })));
    }
}

mod missing_strategy_policy {
    use super::*;

    fn nate_only_book() -> StrategyBook {
        let mut book = StrategyBook::new();
        book.insert(
            "NATE".to_string(),
            make_strategy(1.0, vec![1.0, 2.0], vec![0.5, 0.5]),
        );
        book
    }

    #[test]
    fn skip_includes_trade_with_zero_pnl() {
        let trades = vec![
            make_trade("REY", "2025-01-02", "08:00", 3.0),
            make_trade("NATE", "2025-01-02", "09:30", 2.0),
        ];
        let trajectory = simulate(
            &trades,
            &nate_only_book(),
            10_000.0,
            MissingStrategyPolicy::Skip,
        )
        .unwrap();

        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory[1], 10_000.0);
        assert_relative_eq!(trajectory[2], 10_150.0, max_relative = 1e-12);
    }

    #[test]
    fn fail_aborts_on_first_unknown_operator() {
        let trades = vec![make_trade("REY", "2025-01-02", "08:00", 3.0)];
        let err = simulate(
            &trades,
            &nate_only_book(),
            10_000.0,
            MissingStrategyPolicy::Fail,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TitansimError::MissingStrategy { operator } if operator == "REY"
        ));
    }
}

mod csv_pipeline {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use titansim::adapters::csv_trade_adapter::CsvTradeAdapter;
    use titansim::adapters::csv_report_adapter::CsvReportAdapter;
    use titansim::ports::report_port::{ReportPort, SimulationReport};

    fn write_fixtures() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        fs::write(
            path.join("NATE_XAUUSD.csv"),
            "date,time,direction,rr_max\n\
             2025-01-02,09:30,LONG,2.0\n\
             2025-01-03,14:00,SHORT,0.5\n",
        )
        .unwrap();
        fs::write(
            path.join("REY_XAUUSD.csv"),
            "date,time,direction,rr_max\n\
             2025-01-02,08:00,LONG,1.0\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn full_pipeline_from_files_to_report() {
        let (_dir, path) = write_fixtures();
        let adapter = CsvTradeAdapter::new(path.clone());

        let mut batches = Vec::new();
        for operator in ["NATE", "REY"] {
            batches.push(
                adapter
                    .fetch_trades(operator, "XAUUSD", date(2025, 1, 1), date(2025, 1, 31))
                    .unwrap(),
            );
        }
        let trades = merge_trades(batches);
        assert_eq!(trades.len(), 3);
        assert_eq!(trades[0].operator, "REY");

        let trajectory =
            simulate(&trades, &default_book(), 10_000.0, MissingStrategyPolicy::Skip).unwrap();
        assert_eq!(trajectory.len(), 4);

        let summary = SimulationSummary::compute(&trajectory, &trades);
        let output = path.join("trajectory.csv");
        let report = SimulationReport {
            trajectory: &trajectory,
            summary: &summary,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 1, 31),
        };
        CsvReportAdapter
            .write(&report, output.to_str().unwrap())
            .unwrap();

        let content = fs::read_to_string(output).unwrap();
        assert_eq!(content.lines().count(), 5);
        assert!(content.starts_with("trade_index,balance\n0,10000.00\n"));
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn trades_from_rrs(rrs: &[f64]) -> Vec<TradeRecord> {
        rrs.iter()
            .enumerate()
            .map(|(i, &rr)| {
                let mut t = make_trade("NATE", "2025-01-02", "09:30", rr);
                t.executed_at += chrono::Duration::minutes(i as i64);
                t
            })
            .collect()
    }

    proptest! {
        #[test]
        fn simulate_is_deterministic(rrs in proptest::collection::vec(0.0_f64..5.0, 0..40)) {
            let trades = trades_from_rrs(&rrs);
            let book = default_book();
            let a = simulate(&trades, &book, 10_000.0, MissingStrategyPolicy::Skip).unwrap();
            let b = simulate(&trades, &book, 10_000.0, MissingStrategyPolicy::Skip).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn trajectory_shape_holds(rrs in proptest::collection::vec(0.0_f64..5.0, 0..40)) {
            let trades = trades_from_rrs(&rrs);
            let out = simulate(&trades, &default_book(), 10_000.0, MissingStrategyPolicy::Skip).unwrap();
            prop_assert_eq!(out.len(), trades.len() + 1);
            prop_assert_eq!(out[0], 10_000.0);
        }

        #[test]
        fn full_stop_loses_exactly_risk(rr in 0.0_f64..1.0) {
            // Below the first target the whole position stops out at -risk%.
            let trades = trades_from_rrs(&[rr]);
            let out = simulate(&trades, &default_book(), 10_000.0, MissingStrategyPolicy::Skip).unwrap();
            prop_assert!((out[1] - 10_000.0 * 0.99).abs() < 1e-9);
        }

        #[test]
        fn max_rr_never_loses(rr in 2.0_f64..10.0) {
            let trades = trades_from_rrs(&[rr]);
            let out = simulate(&trades, &default_book(), 10_000.0, MissingStrategyPolicy::Skip).unwrap();
            prop_assert!(out[1] >= 10_000.0);
        }
    }

    #[test]
    fn unused_map_is_not_consulted() {
        // Operators outside the trade set never influence the run.
        let trades = trades_from_rrs(&[2.0]);
        let mut big_book = default_book();
        big_book.insert(
            "GHOST".to_string(),
            make_strategy(5.0, vec![1.0], vec![1.0]),
        );
        let a = simulate(&trades, &big_book, 10_000.0, MissingStrategyPolicy::Skip).unwrap();
        let b = simulate(&trades, &default_book(), 10_000.0, MissingStrategyPolicy::Skip).unwrap();
        assert_eq!(a, b);
    }
}
