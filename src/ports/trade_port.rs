//! Trade history access port trait.

use crate::domain::error::TitansimError;
use crate::domain::trade::TradeRecord;
use chrono::NaiveDate;

pub trait TradePort {
    fn fetch_trades(
        &self,
        operator: &str,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<TradeRecord>, TitansimError>;

    fn list_operators(&self, symbol: &str) -> Result<Vec<String>, TitansimError>;

    fn get_trade_range(
        &self,
        operator: &str,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TitansimError>;
}
