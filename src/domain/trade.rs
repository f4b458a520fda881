//! Trade record representation and chronological normalization.
//!
//! Raw trade histories arrive one batch per operator; the simulator needs a
//! single sequence ordered by the combined date+time key across all operators.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

/// Trade direction as recorded by the operator. Descriptive only: the
/// simulation prices a trade from its achieved RR, not its side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn parse(value: &str) -> Option<Direction> {
        match value.trim().to_uppercase().as_str() {
            "LONG" | "BUY" => Some(Direction::Long),
            "SHORT" | "SELL" => Some(Direction::Short),
            _ => None,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// One historical trade signal. Immutable once ingested; `achieved_rr` is the
/// maximum reward-multiple the trade reached before closing or stopping.
#[derive(Debug, Clone)]
pub struct TradeRecord {
    pub operator: String,
    pub symbol: String,
    pub executed_at: NaiveDateTime,
    pub direction: Direction,
    pub achieved_rr: f64,
}

impl TradeRecord {
    pub fn trade_date(&self) -> NaiveDate {
        self.executed_at.date()
    }
}

/// Merge per-operator batches into one sequence ordered by execution time.
///
/// The sort is stable: trades sharing a timestamp keep their batch order,
/// with earlier batches first.
pub fn merge_trades(batches: Vec<Vec<TradeRecord>>) -> Vec<TradeRecord> {
    let mut merged: Vec<TradeRecord> = batches.into_iter().flatten().collect();
    merged.sort_by_key(|t| t.executed_at);
    merged
}

/// Keep trades whose calendar date falls inside `[start, end]` (inclusive on
/// both ends, matching the date-range selection the UI exposes).
pub fn filter_by_date(
    trades: Vec<TradeRecord>,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<TradeRecord> {
    trades
        .into_iter()
        .filter(|t| {
            let d = t.trade_date();
            d >= start && d <= end
        })
        .collect()
}

/// Per-operator trade counts, for the run summary.
pub fn count_by_operator(trades: &[TradeRecord]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for trade in trades {
        *counts.entry(trade.operator.clone()).or_insert(0) += 1;
    }
    counts
}
