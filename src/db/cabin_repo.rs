use cabinstay_core::{Cabin, CabinId, Settings, StoreError, StoreResult};
use sqlx::SqlitePool;

use super::store_error;

/// Cabins table.
#[derive(Debug, Clone)]
pub struct CabinRepository {
    pool: SqlitePool,
}

/// Fields for a cabin about to be inserted.
#[derive(Debug, Clone)]
pub struct NewCabin {
    pub name: String,
    pub max_capacity: i64,
    pub regular_price: f64,
    pub discount: f64,
    pub description: String,
    pub image: Option<String>,
}

impl NewCabin {
    pub fn new(name: impl Into<String>, max_capacity: i64) -> Self {
        Self {
            name: name.into(),
            max_capacity,
            regular_price: 0.0,
            discount: 0.0,
            description: String::new(),
            image: None,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CabinRow {
    id: i64,
    name: String,
    max_capacity: i64,
    regular_price: f64,
    discount: f64,
    description: String,
    image: Option<String>,
}

impl From<CabinRow> for Cabin {
    fn from(row: CabinRow) -> Self {
        Cabin {
            id: row.id,
            name: row.name,
            max_capacity: row.max_capacity,
            regular_price: row.regular_price,
            discount: row.discount,
            description: row.description,
            image: row.image,
        }
    }
}

impl CabinRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, cabin: &NewCabin) -> StoreResult<Cabin> {
        let result = sqlx::query(
            r#"
            INSERT INTO cabins (name, max_capacity, regular_price, discount, description, image)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&cabin.name)
        .bind(cabin.max_capacity)
        .bind(cabin.regular_price)
        .bind(cabin.discount)
        .bind(&cabin.description)
        .bind(&cabin.image)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        self.get(result.last_insert_rowid()).await
    }

    /// Fetches one cabin; `NotFound` when the id is unknown.
    pub async fn get(&self, id: CabinId) -> StoreResult<Cabin> {
        let row: Option<CabinRow> = sqlx::query_as("SELECT * FROM cabins WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.map(Cabin::from)
            .ok_or_else(|| StoreError::NotFound(format!("cabin {}", id)))
    }

    pub async fn list(&self) -> StoreResult<Vec<Cabin>> {
        let rows: Vec<CabinRow> = sqlx::query_as("SELECT * FROM cabins ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(rows.into_iter().map(Cabin::from).collect())
    }
}

/// The single-row settings table.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct SettingsRow {
    min_booking_length: i64,
    max_booking_length: i64,
    max_guests_per_booking: i64,
    breakfast_price: f64,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> StoreResult<Settings> {
        let row: SettingsRow = sqlx::query_as(
            "SELECT min_booking_length, max_booking_length, max_guests_per_booking, breakfast_price \
             FROM settings WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(Settings {
            min_booking_length: row.min_booking_length,
            max_booking_length: row.max_booking_length,
            max_guests_per_booking: row.max_guests_per_booking,
            breakfast_price: row.breakfast_price,
        })
    }

    pub async fn update(&self, settings: &Settings) -> StoreResult<Settings> {
        sqlx::query(
            r#"
            UPDATE settings
            SET min_booking_length = ?, max_booking_length = ?,
                max_guests_per_booking = ?, breakfast_price = ?
            WHERE id = 1
            "#,
        )
        .bind(settings.min_booking_length)
        .bind(settings.max_booking_length)
        .bind(settings.max_guests_per_booking)
        .bind(settings.breakfast_price)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        self.get().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    async fn setup() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
        (pool, temp_dir)
    }

    #[tokio::test]
    async fn test_create_and_get_cabin() {
        let (pool, _temp) = setup().await;
        let repo = CabinRepository::new(pool);

        let mut cabin = NewCabin::new("001", 2);
        cabin.regular_price = 250.0;
        cabin.image = Some("cabin-001.jpg".into());

        let created = repo.create(&cabin).await.unwrap();
        let fetched = repo.get(created.id).await.unwrap();

        assert_eq!(fetched.name, "001");
        assert_eq!(fetched.max_capacity, 2);
        assert_eq!(fetched.regular_price, 250.0);
        assert_eq!(fetched.image.as_deref(), Some("cabin-001.jpg"));
    }

    #[tokio::test]
    async fn test_get_missing_cabin() {
        let (pool, _temp) = setup().await;
        let repo = CabinRepository::new(pool);

        assert!(matches!(repo.get(5).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let (pool, _temp) = setup().await;
        let repo = CabinRepository::new(pool);

        repo.create(&NewCabin::new("008", 10)).await.unwrap();
        repo.create(&NewCabin::new("002", 2)).await.unwrap();
        repo.create(&NewCabin::new("005", 6)).await.unwrap();

        let names: Vec<_> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["002", "005", "008"]);
    }

    #[tokio::test]
    async fn test_settings_seeded_and_updatable() {
        let (pool, _temp) = setup().await;
        let repo = SettingsRepository::new(pool);

        let seeded = repo.get().await.unwrap();
        assert_eq!(seeded, Settings::default());

        let updated = repo
            .update(&Settings {
                max_booking_length: 30,
                ..seeded
            })
            .await
            .unwrap();
        assert_eq!(updated.max_booking_length, 30);
        assert_eq!(updated.min_booking_length, 1);
    }
}
