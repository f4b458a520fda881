//! CSV trade history adapter.
//!
//! One file per operator, named `{OPERATOR}_{SYMBOL}.csv`, with a header and
//! columns `date,time,direction,rr_max`. Rows whose RR field is non-numeric
//! are dropped with a warning so the simulation core only sees clean data.

use crate::domain::error::TitansimError;
use crate::domain::trade::{Direction, TradeRecord};
use crate::ports::trade_port::TradePort;
use chrono::{NaiveDate, NaiveTime};
use std::fs;
use std::path::PathBuf;

pub struct CsvTradeAdapter {
    base_path: PathBuf,
}

impl CsvTradeAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, operator: &str, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", operator, symbol))
    }

    fn read_all(&self, operator: &str, symbol: &str) -> Result<Vec<TradeRecord>, TitansimError> {
        let path = self.csv_path(operator, symbol);
        let content = fs::read_to_string(&path).map_err(|e| TitansimError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut trades = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| TitansimError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| TitansimError::Data {
                reason: "missing date column".into(),
            })?;
            let date =
                NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| TitansimError::Data {
                    reason: format!("invalid date format: {}", e),
                })?;

            let time_str = record.get(1).ok_or_else(|| TitansimError::Data {
                reason: "missing time column".into(),
            })?;
            let time = parse_time(time_str).map_err(|e| TitansimError::Data {
                reason: format!("invalid time format: {}", e),
            })?;

            let direction_str = record.get(2).ok_or_else(|| TitansimError::Data {
                reason: "missing direction column".into(),
            })?;
            let direction =
                Direction::parse(direction_str).ok_or_else(|| TitansimError::Data {
                    reason: format!("invalid direction value: {}", direction_str),
                })?;

            let rr_str = record.get(3).ok_or_else(|| TitansimError::Data {
                reason: "missing rr_max column".into(),
            })?;
            let achieved_rr: f64 = match rr_str.trim().parse() {
                Ok(v) => v,
                Err(_) => {
                    // Ingestion-side coercion: a malformed RR drops the row
                    // instead of failing the run.
                    eprintln!(
                        "warning: {} {}: dropping trade with non-numeric rr_max {:?}",
                        operator, date, rr_str
                    );
                    continue;
                }
            };

            trades.push(TradeRecord {
                operator: operator.to_string(),
                symbol: symbol.to_string(),
                executed_at: date.and_time(time),
                direction,
                achieved_rr,
            });
        }

        Ok(trades)
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
}

impl TradePort for CsvTradeAdapter {
    fn fetch_trades(
        &self,
        operator: &str,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<TradeRecord>, TitansimError> {
        let mut trades: Vec<TradeRecord> = self
            .read_all(operator, symbol)?
            .into_iter()
            .filter(|t| {
                let d = t.trade_date();
                d >= start_date && d <= end_date
            })
            .collect();

        trades.sort_by_key(|t| t.executed_at);
        Ok(trades)
    }

    fn list_operators(&self, symbol: &str) -> Result<Vec<String>, TitansimError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TitansimError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", symbol);
        let mut operators = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| TitansimError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if name_str.ends_with(&suffix) {
                let operator = &name_str[..name_str.len() - suffix.len()];
                operators.push(operator.to_string());
            }
        }

        operators.sort();
        Ok(operators)
    }

    fn get_trade_range(
        &self,
        operator: &str,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TitansimError> {
        let trades = self.read_all(operator, symbol)?;
        if trades.is_empty() {
            return Ok(None);
        }

        let min = trades.iter().map(|t| t.trade_date()).min().unwrap();
        let max = trades.iter().map(|t| t.trade_date()).max().unwrap();
        Ok(Some((min, max, trades.len())))
    }
}
