//! Store contracts for guests and bookings.
//!
//! Every operation takes the store handle explicitly (`&self`), so callers
//! can inject the SQLite repositories in production and [`MemoryStore`]
//! in tests.
//!
//! [`MemoryStore`]: crate::memory::MemoryStore

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::email::NormalizedEmail;
use crate::error::StoreResult;
use crate::models::{Booking, BookingId, CabinId, Guest, GuestId};

#[async_trait]
pub trait GuestRepository: Send + Sync {
    /// Looks up the guest registered under `email`.
    async fn find_by_email(&self, email: &NormalizedEmail) -> StoreResult<Option<Guest>>;

    /// Inserts a new guest.
    ///
    /// Fails with [`StoreError::Conflict`](crate::StoreError::Conflict) when
    /// a guest with the same email already exists.
    async fn create(&self, email: &NormalizedEmail, full_name: &str) -> StoreResult<Guest>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// All bookings made by one guest.
    async fn list_for_guest(&self, guest_id: GuestId) -> StoreResult<Vec<Booking>>;

    /// Bookings of a cabin that end on or after `as_of`, plus every
    /// checked-in booking of that cabin.
    async fn list_active_for_cabin(
        &self,
        cabin_id: CabinId,
        as_of: NaiveDate,
    ) -> StoreResult<Vec<Booking>>;

    async fn get(&self, booking_id: BookingId) -> StoreResult<Booking>;

    /// Like [`list_for_guest`](Self::list_for_guest), but a session whose
    /// guest is not resolved yet simply has no bookings.
    async fn list_by_guest(&self, guest_id: Option<GuestId>) -> StoreResult<Vec<Booking>> {
        match guest_id {
            Some(id) => self.list_for_guest(id).await,
            None => {
                tracing::warn!("Booking lookup without a guest id, returning no bookings");
                Ok(Vec::new())
            }
        }
    }
}
