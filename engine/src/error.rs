use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("unsupported granularity `{0}` (expected day, month, quarter or year)")]
    InvalidGranularity(String),

    #[error("unsupported group range `{0}`")]
    InvalidGroupRange(String),

    #[error("counter text `{0}` is not a non-negative number")]
    InvalidCounterText(String),

    #[error("calendar arithmetic overflowed past {0}")]
    CalendarOverflow(NaiveDateTime),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
