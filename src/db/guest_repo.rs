use async_trait::async_trait;
use cabinstay_core::{Guest, GuestId, GuestRepository, NormalizedEmail, StoreError, StoreResult};
use chrono::Utc;
use sqlx::SqlitePool;

use super::{parse_timestamp, store_error};

/// Guests table, keyed by normalized email.
#[derive(Debug, Clone)]
pub struct SqliteGuestRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct GuestRow {
    id: i64,
    email: String,
    full_name: String,
    created_at: String,
}

impl GuestRow {
    fn into_guest(self) -> StoreResult<Guest> {
        let email = NormalizedEmail::parse(&self.email).ok_or_else(|| {
            StoreError::DataUnavailable(format!("Guest {} has an empty email", self.id))
        })?;
        Ok(Guest {
            id: self.id,
            email,
            full_name: self.full_name,
            created_at: parse_timestamp(&self.created_at),
        })
    }
}

impl SqliteGuestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: GuestId) -> StoreResult<Option<Guest>> {
        let row: Option<GuestRow> = sqlx::query_as("SELECT * FROM guests WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.map(GuestRow::into_guest).transpose()
    }

    pub async fn list(&self) -> StoreResult<Vec<Guest>> {
        let rows: Vec<GuestRow> = sqlx::query_as("SELECT * FROM guests ORDER BY email")
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        rows.into_iter().map(GuestRow::into_guest).collect()
    }
}

#[async_trait]
impl GuestRepository for SqliteGuestRepository {
    async fn find_by_email(&self, email: &NormalizedEmail) -> StoreResult<Option<Guest>> {
        let row: Option<GuestRow> = sqlx::query_as("SELECT * FROM guests WHERE email = ?")
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.map(GuestRow::into_guest).transpose()
    }

    async fn create(&self, email: &NormalizedEmail, full_name: &str) -> StoreResult<Guest> {
        let result =
            sqlx::query("INSERT INTO guests (email, full_name, created_at) VALUES (?, ?, ?)")
                .bind(email.as_str())
                .bind(full_name)
                .bind(Utc::now().to_rfc3339())
                .execute(&self.pool)
                .await
                .map_err(store_error)?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("guest {}", email)))
    }
}
