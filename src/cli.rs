//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::csv_trade_adapter::CsvTradeAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{validate_simulation_config, validate_strategy_section};
use crate::domain::error::TitansimError;
use crate::domain::simulation::{
    simulate, MissingStrategyPolicy, SimulationConfig, DEFAULT_INITIAL_BALANCE,
};
use crate::domain::strategy::StrategyBook;
use crate::domain::summary::SimulationSummary;
use crate::domain::trade::{merge_trades, TradeRecord};
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::{ReportPort, SimulationReport};
use crate::ports::trade_port::TradePort;

#[derive(Parser, Debug)]
#[command(name = "titansim", about = "Trainer-signal balance simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a balance simulation
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        operator: Option<String>,
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a simulation configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List operators with trade files for a symbol
    ListOperators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Show trade history range for operator(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        operator: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Simulate {
            config,
            output,
            operator,
            start_date,
            end_date,
            dry_run,
        } => run_simulate(
            &config,
            output.as_ref(),
            operator.as_deref(),
            start_date,
            end_date,
            dry_run,
        ),
        Command::Validate { config } => run_validate(&config),
        Command::ListOperators { config, symbol } => {
            run_list_operators(&config, symbol.as_deref())
        }
        Command::Info { config, operator } => run_info(&config, operator.as_deref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TitansimError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_simulate(
    config_path: &PathBuf,
    output_path: Option<&PathBuf>,
    operator_override: Option<&str>,
    start_override: Option<NaiveDate>,
    end_override: Option<NaiveDate>,
    dry_run: bool,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate the [simulation] section
    if let Err(e) = validate_simulation_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 3: Build run parameters, applying CLI date overrides
    let mut sim_config = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Some(start) = start_override {
        sim_config.start_date = start;
    }
    if let Some(end) = end_override {
        sim_config.end_date = end;
    }
    if sim_config.start_date > sim_config.end_date {
        eprintln!("error: start_date must not be after end_date");
        return ExitCode::from(2);
    }

    // Stage 4: Resolve operators and build the strategy book
    let operators = resolve_operators(operator_override, &adapter);
    if operators.is_empty() {
        eprintln!("error: no operators configured");
        return ExitCode::from(2);
    }

    let book = match build_strategy_book(&adapter, &operators) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if sim_config.missing_strategy == MissingStrategyPolicy::Skip {
        for operator in &operators {
            if !book.contains_key(operator) {
                eprintln!(
                    "Warning: no [strategy.{}] section, its trades contribute zero pnl",
                    operator
                );
            }
        }
    }

    if dry_run {
        eprintln!("\nStrategy book:");
        let mut names: Vec<&String> = book.keys().collect();
        names.sort();
        for name in names {
            let s = &book[name];
            eprintln!(
                "  {}: risk {}%, targets {:?}, partials {:?}",
                name, s.risk_percent, s.targets, s.partials
            );
        }
        eprintln!("\nDry run complete: configuration is valid");
        return ExitCode::SUCCESS;
    }

    // Stage 5: Fetch and merge trade histories
    let data_dir = adapter
        .get_string("simulation", "data_dir")
        .unwrap_or_else(|| ".".to_string());
    let trade_port = CsvTradeAdapter::new(PathBuf::from(data_dir));

    let trades = match fetch_all_trades(&trade_port, &operators, &sim_config) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Simulating {} trades, {} to {}",
        trades.len(),
        sim_config.start_date,
        sim_config.end_date,
    );

    // Stage 6: Run the simulation
    let trajectory = match simulate(
        &trades,
        &book,
        sim_config.initial_balance,
        sim_config.missing_strategy,
    ) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 7: Summary to stderr
    let summary = SimulationSummary::compute(&trajectory, &trades);

    eprintln!("\n=== Simulation Results ===");
    eprintln!("Initial Balance:  {:.2}", sim_config.initial_balance);
    eprintln!("Final Balance:    {:.2}", summary.final_balance);
    eprintln!("Total Return:     {:.2}%", summary.total_return * 100.0);
    eprintln!("Peak Balance:     {:.2}", summary.peak_balance);
    eprintln!("Trough Balance:   {:.2}", summary.trough_balance);
    eprintln!("Max Drawdown:     -{:.1}%", summary.max_drawdown * 100.0);
    eprintln!("Trades Processed: {}", summary.trades_processed);

    if !summary.trades_by_operator.is_empty() {
        eprintln!("\n=== Per-Operator Summary ===");
        for (operator, count) in &summary.trades_by_operator {
            eprintln!("  {}: {} trades", operator, count);
        }
    }

    // Stage 8: Write the trajectory report
    let output = output_path
        .cloned()
        .unwrap_or_else(|| PathBuf::from("trajectory.csv"));

    let report = SimulationReport {
        trajectory: &trajectory,
        summary: &summary,
        start_date: sim_config.start_date,
        end_date: sim_config.end_date,
    };

    match CsvReportAdapter.write(&report, &output.display().to_string()) {
        Ok(()) => {
            eprintln!("\nTrajectory written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to write trajectory: {e}");
            (&e).into()
        }
    }
}

pub fn build_simulation_config(
    adapter: &dyn ConfigPort,
) -> Result<SimulationConfig, TitansimError> {
    let start_str =
        adapter
            .get_string("simulation", "start_date")
            .ok_or_else(|| TitansimError::ConfigMissing {
                section: "simulation".into(),
                key: "start_date".into(),
            })?;
    let end_str =
        adapter
            .get_string("simulation", "end_date")
            .ok_or_else(|| TitansimError::ConfigMissing {
                section: "simulation".into(),
                key: "end_date".into(),
            })?;

    let start_date = NaiveDate::parse_from_str(&start_str, "%Y-%m-%d").map_err(|_| {
        TitansimError::ConfigInvalid {
            section: "simulation".into(),
            key: "start_date".into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        }
    })?;
    let end_date = NaiveDate::parse_from_str(&end_str, "%Y-%m-%d").map_err(|_| {
        TitansimError::ConfigInvalid {
            section: "simulation".into(),
            key: "end_date".into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        }
    })?;

    let symbol =
        adapter
            .get_string("simulation", "symbol")
            .ok_or_else(|| TitansimError::ConfigMissing {
                section: "simulation".into(),
                key: "symbol".into(),
            })?;

    let missing_strategy = match adapter.get_string("simulation", "missing_strategy") {
        None => MissingStrategyPolicy::default(),
        Some(s) => {
            MissingStrategyPolicy::parse(&s).ok_or_else(|| TitansimError::ConfigInvalid {
                section: "simulation".into(),
                key: "missing_strategy".into(),
                reason: format!("expected skip or fail, got {}", s),
            })?
        }
    };

    Ok(SimulationConfig {
        start_date,
        end_date,
        initial_balance: adapter.get_double(
            "simulation",
            "initial_balance",
            DEFAULT_INITIAL_BALANCE,
        ),
        symbol,
        missing_strategy,
    })
}

/// Build the strategy book for the selected operators.
///
/// An operator whose `[strategy.<OP>]` section is entirely absent gets no
/// book entry; the simulation's missing-strategy policy decides what happens
/// to its trades. A section that is present but invalid is a hard error.
pub fn build_strategy_book(
    adapter: &dyn ConfigPort,
    operators: &[String],
) -> Result<StrategyBook, TitansimError> {
    let mut book = StrategyBook::new();

    for operator in operators {
        if !has_strategy_section(adapter, operator) {
            continue;
        }
        let strategy = validate_strategy_section(adapter, operator)?;
        book.insert(operator.clone(), strategy);
    }

    Ok(book)
}

fn has_strategy_section(adapter: &dyn ConfigPort, operator: &str) -> bool {
    let section = format!("strategy.{}", operator);
    ["risk_percent", "targets", "partials"]
        .iter()
        .any(|key| adapter.get_string(&section, key).is_some())
}

pub fn resolve_operators(operator_override: Option<&str>, config: &dyn ConfigPort) -> Vec<String> {
    if let Some(op) = operator_override {
        return vec![op.to_uppercase()];
    }

    if let Some(operators_str) = config.get_string("simulation", "operators") {
        return operators_str
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
    }

    vec![]
}

fn fetch_all_trades(
    trade_port: &dyn TradePort,
    operators: &[String],
    sim_config: &SimulationConfig,
) -> Result<Vec<TradeRecord>, TitansimError> {
    let mut batches = Vec::with_capacity(operators.len());
    let mut failed = 0usize;

    for operator in operators {
        match trade_port.fetch_trades(
            operator,
            &sim_config.symbol,
            sim_config.start_date,
            sim_config.end_date,
        ) {
            Ok(trades) => {
                eprintln!("  {}: {} trades", operator, trades.len());
                batches.push(trades);
            }
            Err(e) => {
                eprintln!("Warning: skipping {} ({})", operator, e);
                failed += 1;
            }
        }
    }

    if failed == operators.len() {
        return Err(TitansimError::Data {
            reason: format!(
                "no trade history loaded for any of {} operators",
                operators.len()
            ),
        });
    }

    Ok(merge_trades(batches))
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_simulation_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let operators = resolve_operators(None, &adapter);
    for operator in &operators {
        if !has_strategy_section(&adapter, operator) {
            eprintln!("\n{}: no strategy section", operator);
            continue;
        }
        match validate_strategy_section(&adapter, operator) {
            Ok(s) => {
                eprintln!("\n{}:", operator);
                eprintln!("  risk_percent: {}", s.risk_percent);
                eprintln!("  targets:      {:?}", s.targets);
                eprintln!("  partials:     {:?}", s.partials);
            }
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_list_operators(config_path: &PathBuf, symbol_override: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let symbol = match symbol_override {
        Some(s) => s.to_string(),
        None => match config.get_string("simulation", "symbol") {
            Some(s) => s,
            None => {
                eprintln!("error: symbol is required (use --symbol or set in config)");
                return ExitCode::from(2);
            }
        },
    };

    let data_dir = config
        .get_string("simulation", "data_dir")
        .unwrap_or_else(|| ".".to_string());
    let adapter = CsvTradeAdapter::new(PathBuf::from(data_dir));

    let operators = match adapter.list_operators(&symbol) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if operators.is_empty() {
        eprintln!("No operators found for symbol {}", symbol);
    } else {
        for operator in &operators {
            println!("{}", operator);
        }
        eprintln!("{} operators found", operators.len());
    }
    ExitCode::SUCCESS
}

fn run_info(config_path: &PathBuf, operator_override: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let operators = resolve_operators(operator_override, &config);
    if operators.is_empty() {
        eprintln!("error: no operators configured");
        return ExitCode::from(2);
    }

    let symbol = match config.get_string("simulation", "symbol") {
        Some(s) => s,
        None => {
            eprintln!("error: symbol is required in config");
            return ExitCode::from(2);
        }
    };

    let data_dir = config
        .get_string("simulation", "data_dir")
        .unwrap_or_else(|| ".".to_string());
    let adapter = CsvTradeAdapter::new(PathBuf::from(data_dir));

    for operator in &operators {
        match adapter.get_trade_range(operator, &symbol) {
            Ok(Some((min_date, max_date, count))) => {
                println!(
                    "{} {}: {} trades, {} to {}",
                    operator, symbol, count, min_date, max_date
                );
            }
            Ok(None) => {
                eprintln!("{} {}: no trades found", operator, symbol);
            }
            Err(e) => {
                eprintln!("error querying {} {}: {}", operator, symbol, e);
            }
        }
    }
    ExitCode::SUCCESS
}
