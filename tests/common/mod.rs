#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use titansim::domain::error::TitansimError;
use titansim::domain::strategy::{StrategyBook, StrategyConfig};
pub use titansim::domain::trade::{Direction, TradeRecord};
use titansim::ports::trade_port::TradePort;

pub struct MockTradePort {
    pub data: HashMap<String, Vec<TradeRecord>>,
    pub errors: HashMap<String, String>,
}

impl MockTradePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_trades(mut self, operator: &str, trades: Vec<TradeRecord>) -> Self {
        self.data.insert(operator.to_string(), trades);
        self
    }

    pub fn with_error(mut self, operator: &str, reason: &str) -> Self {
        self.errors.insert(operator.to_string(), reason.to_string());
        self
    }
}

impl TradePort for MockTradePort {
    fn fetch_trades(
        &self,
        operator: &str,
        _symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<TradeRecord>, TitansimError> {
        if let Some(reason) = self.errors.get(operator) {
            return Err(TitansimError::Data {
                reason: reason.clone(),
            });
        }
        let mut trades: Vec<TradeRecord> = self
            .data
            .get(operator)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|t| {
                let d = t.trade_date();
                d >= start_date && d <= end_date
            })
            .collect();
        trades.sort_by_key(|t| t.executed_at);
        Ok(trades)
    }

    fn list_operators(&self, _symbol: &str) -> Result<Vec<String>, TitansimError> {
        let mut operators: Vec<String> = self.data.keys().cloned().collect();
        operators.sort();
        Ok(operators)
    }

    fn get_trade_range(
        &self,
        operator: &str,
        _symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TitansimError> {
        if let Some(reason) = self.errors.get(operator) {
            return Err(TitansimError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(operator) {
            Some(trades) if !trades.is_empty() => {
                let min = trades.iter().map(|t| t.trade_date()).min().unwrap();
                let max = trades.iter().map(|t| t.trade_date()).max().unwrap();
                Ok(Some((min, max, trades.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn timestamp(date: &str, time: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M").unwrap()
}

pub fn make_trade(operator: &str, date: &str, time: &str, rr: f64) -> TradeRecord {
    TradeRecord {
        operator: operator.to_string(),
        symbol: "XAUUSD".to_string(),
        executed_at: timestamp(date, time),
        direction: Direction::Long,
        achieved_rr: rr,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_strategy(risk: f64, targets: Vec<f64>, partials: Vec<f64>) -> StrategyConfig {
    StrategyConfig {
        risk_percent: risk,
        targets,
        partials,
    }
}

/// The three-trainer book from the reference configuration.
pub fn default_book() -> StrategyBook {
    let mut book = StrategyBook::new();
    book.insert(
        "NATE".to_string(),
        make_strategy(1.0, vec![1.0, 2.0], vec![0.5, 0.5]),
    );
    book.insert(
        "REY".to_string(),
        make_strategy(1.0, vec![1.0, 2.0, 3.0], vec![0.3, 0.3, 0.4]),
    );
    book.insert("DAVID".to_string(), make_strategy(1.0, vec![1.0], vec![1.0]));
    book
}
