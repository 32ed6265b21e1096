//! In-memory guest and booking store.
//!
//! Implements both repository traits over plain maps. Used as the test
//! double for the reconciler, enricher and availability calculator, with
//! switches to simulate store outages and concurrent first logins.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::email::NormalizedEmail;
use crate::error::{StoreError, StoreResult};
use crate::models::{Booking, BookingId, CabinId, Guest, GuestId};
use crate::repository::{BookingRepository, GuestRepository};

#[derive(Debug, Default)]
struct Tables {
    guests: BTreeMap<NormalizedEmail, Guest>,
    bookings: BTreeMap<BookingId, Booking>,
    next_guest_id: GuestId,
}

/// Map-backed store.
///
/// Thread-safe via internal RwLock; the lock is never held across an await.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_reads: AtomicBool,
    fail_creates: AtomicBool,
    race_next_create: AtomicBool,
    create_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every lookup fail with `DataUnavailable`.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every guest insert fail with `DataUnavailable`.
    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    /// The next guest insert behaves as if another request inserted the
    /// same email first: the guest is stored and the call gets `Conflict`.
    pub fn race_next_create(&self) {
        self.race_next_create.store(true, Ordering::SeqCst);
    }

    /// Number of times `create` has been called, successful or not.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn guest_count(&self) -> usize {
        self.read().guests.len()
    }

    pub fn guests(&self) -> Vec<Guest> {
        self.read().guests.values().cloned().collect()
    }

    pub fn insert_booking(&self, booking: Booking) {
        self.write().bookings.insert(booking.id, booking);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }

    fn check_reads(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::DataUnavailable("memory store offline".into()));
        }
        Ok(())
    }

    fn insert_guest(tables: &mut Tables, email: &NormalizedEmail, full_name: &str) -> Guest {
        tables.next_guest_id += 1;
        let guest = Guest {
            id: tables.next_guest_id,
            email: email.clone(),
            full_name: full_name.to_string(),
            created_at: Utc::now(),
        };
        tables.guests.insert(email.clone(), guest.clone());
        guest
    }
}

#[async_trait]
impl GuestRepository for MemoryStore {
    async fn find_by_email(&self, email: &NormalizedEmail) -> StoreResult<Option<Guest>> {
        self.check_reads()?;
        Ok(self.read().guests.get(email).cloned())
    }

    async fn create(&self, email: &NormalizedEmail, full_name: &str) -> StoreResult<Guest> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(StoreError::DataUnavailable("memory store offline".into()));
        }

        let mut tables = self.write();

        if self.race_next_create.swap(false, Ordering::SeqCst) {
            Self::insert_guest(&mut tables, email, full_name);
            return Err(StoreError::Conflict(format!("guest {} already exists", email)));
        }

        if tables.guests.contains_key(email) {
            return Err(StoreError::Conflict(format!("guest {} already exists", email)));
        }

        Ok(Self::insert_guest(&mut tables, email, full_name))
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn list_for_guest(&self, guest_id: GuestId) -> StoreResult<Vec<Booking>> {
        self.check_reads()?;
        Ok(self
            .read()
            .bookings
            .values()
            .filter(|b| b.guest_id == guest_id)
            .cloned()
            .collect())
    }

    async fn list_active_for_cabin(
        &self,
        cabin_id: CabinId,
        as_of: NaiveDate,
    ) -> StoreResult<Vec<Booking>> {
        self.check_reads()?;
        Ok(self
            .read()
            .bookings
            .values()
            .filter(|b| b.cabin_id == cabin_id && b.is_active(as_of))
            .cloned()
            .collect())
    }

    async fn get(&self, booking_id: BookingId) -> StoreResult<Booking> {
        self.check_reads()?;
        self.read()
            .bookings
            .get(&booking_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("booking {}", booking_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;

    fn email(raw: &str) -> NormalizedEmail {
        NormalizedEmail::parse(raw).unwrap()
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_guest() {
        let store = MemoryStore::new();
        let created = store.create(&email("a@example.com"), "Alice").await.unwrap();

        let found = store.find_by_email(&email("A@Example.com ")).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let store = MemoryStore::new();
        store.create(&email("a@example.com"), "Alice").await.unwrap();

        let result = store.create(&email("a@example.com"), "Other").await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.guest_count(), 1);
    }

    #[tokio::test]
    async fn test_race_inserts_then_conflicts() {
        let store = MemoryStore::new();
        store.race_next_create();

        let result = store.create(&email("a@example.com"), "Alice").await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.guest_count(), 1);

        // Only the next create is affected
        store.create(&email("b@example.com"), "Bob").await.unwrap();
        assert_eq!(store.guest_count(), 2);
    }

    #[tokio::test]
    async fn test_list_by_guest_without_id_is_empty() {
        let store = MemoryStore::new();
        store.insert_booking(Booking::new(1, 1, 1, day(3, 1), day(3, 2)));

        assert!(store.list_by_guest(None).await.unwrap().is_empty());
        assert_eq!(store.list_by_guest(Some(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_by_guest_without_id_ignores_outage() {
        let store = MemoryStore::new();
        store.fail_reads(true);

        assert!(store.list_by_guest(None).await.unwrap().is_empty());
        assert!(store.list_by_guest(Some(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_list_active_for_cabin() {
        let store = MemoryStore::new();
        store.insert_booking(Booking::new(1, 1, 1, day(1, 1), day(1, 2)));
        store.insert_booking(
            Booking::new(2, 1, 1, day(1, 1), day(1, 2)).with_status(BookingStatus::CheckedIn),
        );
        store.insert_booking(Booking::new(3, 1, 1, day(5, 1), day(5, 2)));
        store.insert_booking(Booking::new(4, 2, 1, day(5, 1), day(5, 2)));

        let active = store.list_active_for_cabin(1, day(3, 1)).await.unwrap();
        let ids: Vec<_> = active.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_get_missing_booking() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get(42).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
