use crate::domain::{models::venue::Venue, ports::VenueRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteVenueRepo {
    pool: SqlitePool,
}

impl SqliteVenueRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VenueRepository for SqliteVenueRepo {
    async fn create(&self, venue: &Venue) -> Result<Venue, AppError> {
        sqlx::query_as::<_, Venue>(
            "INSERT INTO venues (id, name, description, address, city, country, capacity, amenities, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&venue.id).bind(&venue.name).bind(&venue.description).bind(&venue.address).bind(&venue.city)
            .bind(&venue.country).bind(venue.capacity).bind(&venue.amenities).bind(venue.is_active)
            .bind(venue.created_at).bind(venue.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Venue>, AppError> {
        sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Venue>, AppError> {
        sqlx::query_as::<_, Venue>("SELECT * FROM venues ORDER BY name ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, venue: &Venue) -> Result<Venue, AppError> {
        sqlx::query_as::<_, Venue>(
            "UPDATE venues SET name=?, description=?, address=?, city=?, country=?, capacity=?, amenities=?, is_active=?, updated_at=?
             WHERE id=?
             RETURNING *"
        )
            .bind(&venue.name).bind(&venue.description).bind(&venue.address).bind(&venue.city).bind(&venue.country)
            .bind(venue.capacity).bind(&venue.amenities).bind(venue.is_active).bind(venue.updated_at)
            .bind(&venue.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Venue not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let schedules: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schedules WHERE venue_id = ?").bind(id).fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        let teachers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teachers WHERE venue_id = ?").bind(id).fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        if schedules > 0 || teachers > 0 {
            return Err(AppError::ReferentialIntegrity(format!(
                "Venue is used by {} schedule(s) and {} teacher(s); deactivate the venue instead", schedules, teachers
            )));
        }
        let result = sqlx::query("DELETE FROM venues WHERE id = ?").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Venue not found".into())); }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
