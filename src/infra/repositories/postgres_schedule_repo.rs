use crate::domain::{models::schedule::{DayOfWeek, ScheduleRow, UnifiedSchedule}, ports::ScheduleRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

const SELECT_SCHEDULES: &str =
    "SELECT s.*, t.name AS teacher_name, v.name AS venue_name, st.name AS service_type_name
     FROM schedules s
     LEFT JOIN teachers t ON t.id = s.teacher_id
     LEFT JOIN venues v ON v.id = s.venue_id
     LEFT JOIN service_types st ON st.id = s.service_type_id";

pub struct PostgresScheduleRepo {
    pool: PgPool,
}

impl PostgresScheduleRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(tx: &mut Transaction<'_, Postgres>, schedule: &UnifiedSchedule) -> Result<(), AppError> {
        let cols = schedule.columns();
        sqlx::query(
            "INSERT INTO schedules (id, kind, teacher_id, venue_id, service_type_id, name, description, session_duration_min,
                                    day_of_week, start_time, end_time, is_available, max_bookings, is_recurrent, end_date, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)"
        )
            .bind(&schedule.id).bind(cols.kind).bind(cols.teacher_id).bind(cols.venue_id).bind(cols.service_type_id)
            .bind(cols.name).bind(cols.description).bind(cols.session_duration_min)
            .bind(schedule.day_of_week.as_str()).bind(schedule.start_time).bind(schedule.end_time)
            .bind(schedule.is_available).bind(schedule.max_bookings).bind(schedule.is_recurrent).bind(schedule.end_date)
            .bind(schedule.created_at).bind(schedule.updated_at)
            .execute(&mut **tx).await.map_err(AppError::Database)?;
        Ok(())
    }
}

fn into_schedules(rows: Vec<ScheduleRow>) -> Result<Vec<UnifiedSchedule>, AppError> {
    rows.into_iter()
        .map(|row| UnifiedSchedule::try_from(row).map_err(AppError::InternalWithMsg))
        .collect()
}

#[async_trait]
impl ScheduleRepository for PostgresScheduleRepo {
    async fn create_batch(&self, schedules: &[UnifiedSchedule]) -> Result<Vec<UnifiedSchedule>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        for schedule in schedules {
            Self::insert(&mut tx, schedule).await?;
        }
        tx.commit().await.map_err(AppError::Database)?;

        let mut created = Vec::with_capacity(schedules.len());
        for schedule in schedules {
            let stored = self.find_by_id(&schedule.id).await?
                .ok_or(AppError::InternalWithMsg(format!("Schedule {} vanished after insert", schedule.id)))?;
            created.push(stored);
        }
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UnifiedSchedule>, AppError> {
        let row = sqlx::query_as::<_, ScheduleRow>(&format!("{} WHERE s.id = $1", SELECT_SCHEDULES))
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?;
        row.map(|r| UnifiedSchedule::try_from(r).map_err(AppError::InternalWithMsg)).transpose()
    }

    async fn list(&self) -> Result<Vec<UnifiedSchedule>, AppError> {
        let rows = sqlx::query_as::<_, ScheduleRow>(&format!("{} ORDER BY s.start_time ASC", SELECT_SCHEDULES))
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        into_schedules(rows)
    }

    async fn list_by_day(&self, day: DayOfWeek) -> Result<Vec<UnifiedSchedule>, AppError> {
        let rows = sqlx::query_as::<_, ScheduleRow>(&format!("{} WHERE s.day_of_week = $1 ORDER BY s.start_time ASC", SELECT_SCHEDULES))
            .bind(day.as_str())
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        into_schedules(rows)
    }

    async fn update(&self, schedule: &UnifiedSchedule) -> Result<UnifiedSchedule, AppError> {
        let cols = schedule.columns();
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let was_available: Option<bool> = sqlx::query_scalar("SELECT is_available FROM schedules WHERE id = $1 FOR UPDATE")
            .bind(&schedule.id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;
        let Some(was_available) = was_available else {
            return Err(AppError::NotFound("Schedule not found".into()));
        };

        sqlx::query(
            "UPDATE schedules SET kind=$1, teacher_id=$2, venue_id=$3, service_type_id=$4, name=$5, description=$6, session_duration_min=$7,
                                  day_of_week=$8, start_time=$9, end_time=$10, is_available=$11, max_bookings=$12, is_recurrent=$13, end_date=$14, updated_at=$15
             WHERE id=$16"
        )
            .bind(cols.kind).bind(cols.teacher_id).bind(cols.venue_id).bind(cols.service_type_id)
            .bind(cols.name).bind(cols.description).bind(cols.session_duration_min)
            .bind(schedule.day_of_week.as_str()).bind(schedule.start_time).bind(schedule.end_time)
            .bind(schedule.is_available).bind(schedule.max_bookings).bind(schedule.is_recurrent).bind(schedule.end_date)
            .bind(schedule.updated_at)
            .bind(&schedule.id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        if was_available != schedule.is_available {
            sqlx::query("UPDATE schedule_slots SET is_available = $1, updated_at = $2 WHERE schedule_id = $3 AND start_time > $2")
                .bind(schedule.is_available).bind(schedule.updated_at).bind(&schedule.id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;

        self.find_by_id(&schedule.id).await?
            .ok_or(AppError::NotFound("Schedule not found".into()))
    }

    async fn set_availability(&self, id: &str, available: bool, now: DateTime<Utc>) -> Result<Option<UnifiedSchedule>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let result = sqlx::query("UPDATE schedules SET is_available = $1, updated_at = $2 WHERE id = $3")
            .bind(available).bind(now).bind(id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Ok(None); }

        sqlx::query("UPDATE schedule_slots SET is_available = $1, updated_at = $2 WHERE schedule_id = $3 AND start_time > $4")
            .bind(available).bind(now).bind(id).bind(now)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        tx.commit().await.map_err(AppError::Database)?;

        self.find_by_id(id).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let slots: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schedule_slots WHERE schedule_id = $1").bind(id).fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        if slots > 0 {
            return Err(AppError::ReferentialIntegrity(format!(
                "Schedule has {} generated slot(s); deactivate it instead", slots
            )));
        }
        let result = sqlx::query("DELETE FROM schedules WHERE id = $1").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Schedule not found".into())); }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
