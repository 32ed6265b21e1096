//! Error types shared by repositories and the availability calculator.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::BookingId;

/// Errors returned by guest and booking repositories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not serve the request (connection, I/O, corrupt row).
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// A unique constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while deriving blocked dates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvailabilityError {
    /// A booking ends before it starts.
    #[error("Booking {booking_id} has an invalid interval: {start} to {end}")]
    InvalidInterval {
        booking_id: BookingId,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
