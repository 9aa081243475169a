//! Error types for availability-engine operations.

use thiserror::Error;

use crate::model::Day;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("No schedule found for user '{0}'")]
    NotFound(String),

    #[error("No schedule found for {0}")]
    NoScheduleForDay(Day),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, AvailabilityError>;
