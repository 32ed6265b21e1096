use async_trait::async_trait;
use cabinstay_core::{
    Booking, BookingId, BookingRepository, BookingStatus, CabinId, GuestId, StoreError,
    StoreResult,
};
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use super::{parse_day, parse_timestamp, store_error};

/// Bookings table.
#[derive(Debug, Clone)]
pub struct SqliteBookingRepository {
    pool: SqlitePool,
}

/// Fields for a booking about to be inserted.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub cabin_id: CabinId,
    pub guest_id: GuestId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub num_guests: i64,
    pub status: BookingStatus,
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    cabin_id: i64,
    guest_id: i64,
    start_date: String,
    end_date: String,
    num_guests: i64,
    status: String,
    created_at: String,
}

impl BookingRow {
    fn into_booking(self) -> StoreResult<Booking> {
        let status = self
            .status
            .parse::<BookingStatus>()
            .map_err(StoreError::DataUnavailable)?;

        Ok(Booking {
            id: self.id,
            cabin_id: self.cabin_id,
            guest_id: self.guest_id,
            start_date: parse_day(&self.start_date)?,
            end_date: parse_day(&self.end_date)?,
            num_guests: self.num_guests,
            status,
            created_at: parse_timestamp(&self.created_at),
        })
    }
}

fn hydrate(rows: Vec<BookingRow>) -> StoreResult<Vec<Booking>> {
    rows.into_iter().map(BookingRow::into_booking).collect()
}

impl SqliteBookingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, booking: &NewBooking) -> StoreResult<Booking> {
        let result = sqlx::query(
            r#"
            INSERT INTO bookings (cabin_id, guest_id, start_date, end_date, num_guests, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(booking.cabin_id)
        .bind(booking.guest_id)
        .bind(booking.start_date.to_string())
        .bind(booking.end_date.to_string())
        .bind(booking.num_guests)
        .bind(booking.status.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        self.get(result.last_insert_rowid()).await
    }

    pub async fn set_status(&self, id: BookingId, status: BookingStatus) -> StoreResult<()> {
        let result = sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("booking {}", id)));
        }
        Ok(())
    }

    pub async fn list_for_cabin(&self, cabin_id: CabinId) -> StoreResult<Vec<Booking>> {
        let rows: Vec<BookingRow> =
            sqlx::query_as("SELECT * FROM bookings WHERE cabin_id = ? ORDER BY start_date")
                .bind(cabin_id)
                .fetch_all(&self.pool)
                .await
                .map_err(store_error)?;

        hydrate(rows)
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepository {
    async fn list_for_guest(&self, guest_id: GuestId) -> StoreResult<Vec<Booking>> {
        let rows: Vec<BookingRow> =
            sqlx::query_as("SELECT * FROM bookings WHERE guest_id = ? ORDER BY start_date")
                .bind(guest_id)
                .fetch_all(&self.pool)
                .await
                .map_err(store_error)?;

        hydrate(rows)
    }

    async fn list_active_for_cabin(
        &self,
        cabin_id: CabinId,
        as_of: NaiveDate,
    ) -> StoreResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
            SELECT * FROM bookings
            WHERE cabin_id = ?
              AND (date(end_date) >= date(?) OR status = 'checked-in')
            ORDER BY start_date
            "#,
        )
        .bind(cabin_id)
        .bind(as_of.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        hydrate(rows)
    }

    async fn get(&self, booking_id: BookingId) -> StoreResult<Booking> {
        let row: Option<BookingRow> = sqlx::query_as("SELECT * FROM bookings WHERE id = ?")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.ok_or_else(|| StoreError::NotFound(format!("booking {}", booking_id)))?
            .into_booking()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_db, CabinRepository, NewCabin, SqliteGuestRepository};
    use cabinstay_core::{blocked_dates, GuestRepository, NormalizedEmail};
    use tempfile::TempDir;

    struct TestContext {
        repo: SqliteBookingRepository,
        pool: SqlitePool,
        cabin_id: CabinId,
        guest_id: GuestId,
        _temp_dir: TempDir,
    }

    async fn setup_repo() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();

        let cabin = CabinRepository::new(pool.clone())
            .create(&NewCabin::new("001", 2))
            .await
            .unwrap();
        let guest = SqliteGuestRepository::new(pool.clone())
            .create(&NormalizedEmail::parse("guest@example.com").unwrap(), "Guest")
            .await
            .unwrap();

        TestContext {
            repo: SqliteBookingRepository::new(pool.clone()),
            pool,
            cabin_id: cabin.id,
            guest_id: guest.id,
            _temp_dir: temp_dir,
        }
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn new_booking(ctx: &TestContext, start: NaiveDate, end: NaiveDate) -> NewBooking {
        NewBooking {
            cabin_id: ctx.cabin_id,
            guest_id: ctx.guest_id,
            start_date: start,
            end_date: end,
            num_guests: 2,
            status: BookingStatus::Unconfirmed,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_booking() {
        let ctx = setup_repo().await;

        let created = ctx
            .repo
            .create(&new_booking(&ctx, day(3, 10), day(3, 12)))
            .await
            .unwrap();
        let fetched = ctx.repo.get(created.id).await.unwrap();

        assert_eq!(fetched.start_date, day(3, 10));
        assert_eq!(fetched.end_date, day(3, 12));
        assert_eq!(fetched.num_guests, 2);
        assert_eq!(fetched.status, BookingStatus::Unconfirmed);
    }

    #[tokio::test]
    async fn test_get_missing_booking() {
        let ctx = setup_repo().await;
        assert!(matches!(
            ctx.repo.get(999).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_by_guest() {
        let ctx = setup_repo().await;
        ctx.repo
            .create(&new_booking(&ctx, day(3, 10), day(3, 12)))
            .await
            .unwrap();
        ctx.repo
            .create(&new_booking(&ctx, day(1, 2), day(1, 4)))
            .await
            .unwrap();

        let bookings = ctx.repo.list_by_guest(Some(ctx.guest_id)).await.unwrap();
        assert_eq!(bookings.len(), 2);
        assert_eq!(bookings[0].start_date, day(1, 2));

        assert!(ctx.repo.list_by_guest(None).await.unwrap().is_empty());
        assert!(ctx.repo.list_by_guest(Some(12345)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_active_for_cabin_policy() {
        let ctx = setup_repo().await;

        let lapsed = ctx
            .repo
            .create(&new_booking(&ctx, day(1, 1), day(1, 3)))
            .await
            .unwrap();
        let overstay = ctx
            .repo
            .create(&new_booking(&ctx, day(1, 10), day(1, 12)))
            .await
            .unwrap();
        ctx.repo
            .set_status(overstay.id, BookingStatus::CheckedIn)
            .await
            .unwrap();
        let ends_today = ctx
            .repo
            .create(&new_booking(&ctx, day(1, 28), day(2, 1)))
            .await
            .unwrap();
        let upcoming = ctx
            .repo
            .create(&new_booking(&ctx, day(4, 1), day(4, 3)))
            .await
            .unwrap();

        let active = ctx
            .repo
            .list_active_for_cabin(ctx.cabin_id, day(2, 1))
            .await
            .unwrap();
        let ids: Vec<_> = active.iter().map(|b| b.id).collect();

        assert!(!ids.contains(&lapsed.id));
        assert_eq!(ids, vec![overstay.id, ends_today.id, upcoming.id]);
    }

    #[tokio::test]
    async fn test_active_for_other_cabin_is_empty() {
        let ctx = setup_repo().await;
        ctx.repo
            .create(&new_booking(&ctx, day(4, 1), day(4, 3)))
            .await
            .unwrap();

        let active = ctx
            .repo
            .list_active_for_cabin(ctx.cabin_id + 1, day(1, 1))
            .await
            .unwrap();
        assert!(active.is_empty());
    }

    #[tokio::test]
    async fn test_timestamp_dates_are_read_at_day_granularity() {
        let ctx = setup_repo().await;

        sqlx::query(
            "INSERT INTO bookings (cabin_id, guest_id, start_date, end_date, status, created_at) \
             VALUES (?, ?, '2024-03-10T14:00:00Z', '2024-03-12T10:00:00Z', 'unconfirmed', '2024-01-01T00:00:00Z')",
        )
        .bind(ctx.cabin_id)
        .bind(ctx.guest_id)
        .execute(&ctx.pool)
        .await
        .unwrap();

        let active = ctx
            .repo
            .list_active_for_cabin(ctx.cabin_id, day(3, 12))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);

        let blocked = blocked_dates(&active).unwrap();
        assert_eq!(
            blocked.into_iter().collect::<Vec<_>>(),
            vec![day(3, 10), day(3, 11), day(3, 12)]
        );
    }

    #[tokio::test]
    async fn test_set_status_missing_booking() {
        let ctx = setup_repo().await;
        assert!(matches!(
            ctx.repo.set_status(77, BookingStatus::CheckedOut).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
