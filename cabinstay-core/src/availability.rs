//! Blocked-date calculation for cabins.
//!
//! A cabin is unavailable on every calendar day covered by one of its
//! active bookings, both the arrival and the departure day included.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::AvailabilityError;
use crate::models::{Booking, CabinId};
use crate::repository::BookingRepository;

/// Days on which a cabin cannot take a new overlapping booking.
///
/// Iterates in ascending date order; serializes as a list of ISO dates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BlockedDateSet(BTreeSet<NaiveDate>);

impl BlockedDateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.0.contains(date)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NaiveDate> {
        self.0.iter()
    }

    /// Whether any day of `[start, end]` is already taken.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= end && self.0.range(start..=end).next().is_some()
    }

    fn insert_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.0.extend(start.iter_days().take_while(|day| *day <= end));
    }
}

impl IntoIterator for BlockedDateSet {
    type Item = NaiveDate;
    type IntoIter = std::collections::btree_set::IntoIter<NaiveDate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Unions the day ranges of `bookings`.
///
/// Fails on the first booking whose end date precedes its start date.
pub fn blocked_dates<'a, I>(bookings: I) -> Result<BlockedDateSet, AvailabilityError>
where
    I: IntoIterator<Item = &'a Booking>,
{
    let mut blocked = BlockedDateSet::new();

    for booking in bookings {
        if booking.end_date < booking.start_date {
            return Err(AvailabilityError::InvalidInterval {
                booking_id: booking.id,
                start: booking.start_date,
                end: booking.end_date,
            });
        }
        blocked.insert_range(booking.start_date, booking.end_date);
    }

    Ok(blocked)
}

/// Blocked dates of one cabin, as seen at `now`.
///
/// `now` is truncated to its UTC calendar day before querying active
/// bookings.
pub async fn booked_dates_for_cabin(
    bookings: &dyn BookingRepository,
    cabin_id: CabinId,
    now: DateTime<Utc>,
) -> Result<BlockedDateSet, AvailabilityError> {
    let today = now.date_naive();
    let active = bookings.list_active_for_cabin(cabin_id, today).await?;
    blocked_dates(&active)
}
