//! Balance simulation engine.
//!
//! Replays a chronologically ordered trade sequence against per-operator
//! strategies, compounding a single account balance. Each trade is sized
//! from the balance current at the time it is processed, so the trajectory
//! is path-dependent: reordering trades changes the result.

use crate::domain::error::TitansimError;
use crate::domain::strategy::{StrategyBook, StrategyConfig};
use crate::domain::trade::TradeRecord;
use chrono::NaiveDate;

/// Starting account value used when the configuration does not override it.
pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;

/// Run parameters resolved from the `[simulation]` config section.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_balance: f64,
    pub symbol: String,
    pub missing_strategy: MissingStrategyPolicy,
}

/// What to do with a trade whose operator has no strategy in the book.
///
/// `Skip` appends the unchanged balance (the trade contributes zero pnl, so
/// the length guarantee `output == trades + 1` still holds); `Fail` aborts
/// the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingStrategyPolicy {
    #[default]
    Skip,
    Fail,
}

impl MissingStrategyPolicy {
    pub fn parse(value: &str) -> Option<MissingStrategyPolicy> {
        match value.trim().to_lowercase().as_str() {
            "skip" => Some(MissingStrategyPolicy::Skip),
            "fail" => Some(MissingStrategyPolicy::Fail),
            _ => None,
        }
    }
}

/// Profit or loss of one trade against the balance it was sized from.
///
/// Walks the targets in ascending order. Each reached target locks in
/// `risk% * target * partial` of the balance and shrinks the open fraction;
/// the first unreached target stops the remainder out at full risk and ends
/// the walk. A trade that reaches every target never takes a loss leg.
pub fn trade_pnl(trade: &TradeRecord, strategy: &StrategyConfig, balance: f64) -> f64 {
    let risk = strategy.risk_percent / 100.0;
    let mut open_fraction = 1.0;
    let mut pnl = 0.0;

    for (&target, &partial) in strategy.targets.iter().zip(&strategy.partials) {
        if trade.achieved_rr >= target {
            pnl += risk * target * partial * balance;
            open_fraction -= partial;
        } else {
            pnl -= risk * open_fraction * balance;
            break;
        }
    }

    pnl
}

/// Run the balance simulation over `trades` in input order.
///
/// Returns the trajectory: `initial_balance` followed by one balance per
/// trade. Every strategy in the book is validated up front; an invalid one
/// fails the whole run before any balance is computed.
pub fn simulate(
    trades: &[TradeRecord],
    strategies: &StrategyBook,
    initial_balance: f64,
    missing: MissingStrategyPolicy,
) -> Result<Vec<f64>, TitansimError> {
    for strategy in strategies.values() {
        strategy.validate()?;
    }

    let mut trajectory = Vec::with_capacity(trades.len() + 1);
    let mut balance = initial_balance;
    trajectory.push(balance);

    for trade in trades {
        match strategies.get(&trade.operator) {
            Some(strategy) => {
                balance += trade_pnl(trade, strategy, balance);
            }
            None => match missing {
                MissingStrategyPolicy::Skip => {}
                MissingStrategyPolicy::Fail => {
                    return Err(TitansimError::MissingStrategy {
                        operator: trade.operator.clone(),
                    });
                }
            },
        }
        trajectory.push(balance);
    }

    Ok(trajectory)
}
