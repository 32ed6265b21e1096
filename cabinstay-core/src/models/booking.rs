use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::booking_status::BookingStatus;
use super::cabin::CabinId;
use super::guest::GuestId;

pub type BookingId = i64;

/// A reservation of one cabin by one guest over a closed range of days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub cabin_id: CabinId,
    pub guest_id: GuestId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub num_guests: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        id: BookingId,
        cabin_id: CabinId,
        guest_id: GuestId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            cabin_id,
            guest_id,
            start_date,
            end_date,
            num_guests: 1,
            status: BookingStatus::Unconfirmed,
            created_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: BookingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_num_guests(mut self, num_guests: i64) -> Self {
        self.num_guests = num_guests;
        self
    }

    /// Whether this booking still holds the cabin as of `as_of`.
    ///
    /// Upcoming or ongoing stays count, and so does any checked-in stay even
    /// if its recorded end date has already passed.
    pub fn is_active(&self, as_of: NaiveDate) -> bool {
        self.end_date >= as_of || self.status == BookingStatus::CheckedIn
    }
}
