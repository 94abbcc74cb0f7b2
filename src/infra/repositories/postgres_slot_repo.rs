use crate::domain::{models::slot::{ScheduleSlot, SlotListing, SlotQuery}, ports::SlotRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresSlotRepo {
    pool: PgPool,
}

impl PostgresSlotRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlotRepository for PostgresSlotRepo {
    async fn insert_many(&self, slots: &[ScheduleSlot]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut inserted = 0;
        for slot in slots {
            let result = sqlx::query(
                "INSERT INTO schedule_slots (id, schedule_id, start_time, end_time, capacity, booked_count, is_available, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                 ON CONFLICT (schedule_id, start_time) DO NOTHING"
            )
                .bind(&slot.id).bind(&slot.schedule_id).bind(slot.start_time).bind(slot.end_time)
                .bind(slot.capacity).bind(slot.booked_count).bind(slot.is_available)
                .bind(slot.created_at).bind(slot.updated_at)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
            inserted += result.rows_affected();
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(inserted)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ScheduleSlot>, AppError> {
        sqlx::query_as::<_, ScheduleSlot>("SELECT * FROM schedule_slots WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_schedule(&self, schedule_id: &str) -> Result<Vec<ScheduleSlot>, AppError> {
        sqlx::query_as::<_, ScheduleSlot>("SELECT * FROM schedule_slots WHERE schedule_id = $1 ORDER BY start_time ASC")
            .bind(schedule_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_in_range(&self, from: DateTime<Utc>, to: DateTime<Utc>, query: &SlotQuery) -> Result<Vec<SlotListing>, AppError> {
        sqlx::query_as::<_, SlotListing>(
            "SELECT ss.id, ss.schedule_id, ss.start_time, ss.end_time, ss.capacity, ss.booked_count, ss.is_available,
                    s.teacher_id, t.name AS teacher_name, s.venue_id, v.name AS venue_name,
                    s.service_type_id, st.name AS service_type_name, st.duration_min AS service_duration_min
             FROM schedule_slots ss
             JOIN schedules s ON s.id = ss.schedule_id
             LEFT JOIN teachers t ON t.id = s.teacher_id
             LEFT JOIN venues v ON v.id = s.venue_id
             LEFT JOIN service_types st ON st.id = s.service_type_id
             WHERE ss.start_time >= $1 AND ss.start_time < $2
               AND (NOT $3 OR (ss.is_available AND s.is_available AND ss.booked_count < ss.capacity))
               AND ($4::TEXT IS NULL OR s.teacher_id = $4)
               AND ($5::TEXT IS NULL OR s.venue_id = $5)
               AND ($6::TEXT IS NULL OR s.service_type_id = $6)
             ORDER BY ss.start_time ASC"
        )
            .bind(from).bind(to).bind(query.available_only)
            .bind(&query.teacher_id).bind(&query.venue_id).bind(&query.service_type_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
