//! Error types for scheduling and routing operations.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    #[error("Invalid scheduling request: {0}")]
    InvalidSchedulingRequest(String),

    #[error("Availability lookup failed: {0}")]
    AvailabilityLookupFailed(#[from] StoreError),

    #[error("Invalid route input: {0}")]
    RouteInputInvalid(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
