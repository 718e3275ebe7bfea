use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("no market snapshots as of {as_of}: refresh the universe first")]
    NoMarketData { as_of: NaiveDate },

    #[error("invalid run parameter: {0}")]
    InvalidParameter(String),
}
