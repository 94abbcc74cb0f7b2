use crate::domain::{models::booking::{Booking, BookingDetails, BookingStatus}, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

const SELECT_DETAILS: &str =
    "SELECT b.*, ss.start_time, ss.end_time, up.package_name,
            t.name AS teacher_name, v.name AS venue_name, s.name AS schedule_name
     FROM bookings b
     JOIN schedule_slots ss ON ss.id = b.schedule_slot_id
     JOIN schedules s ON s.id = ss.schedule_id
     JOIN user_packages up ON up.id = b.user_package_id
     LEFT JOIN teachers t ON t.id = s.teacher_id
     LEFT JOIN venues v ON v.id = s.venue_id";

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create_atomic(&self, booking: &Booking) -> Result<Booking, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let reserved = sqlx::query(
            "UPDATE schedule_slots SET booked_count = booked_count + 1, updated_at = ?
             WHERE id = ? AND is_available = 1 AND booked_count < capacity
               AND EXISTS (SELECT 1 FROM schedules s WHERE s.id = schedule_slots.schedule_id AND s.is_available = 1)"
        )
            .bind(now).bind(&booking.schedule_slot_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        if reserved.rows_affected() == 0 {
            let exists: Option<String> = sqlx::query_scalar("SELECT id FROM schedule_slots WHERE id = ?")
                .bind(&booking.schedule_slot_id)
                .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;
            return Err(match exists {
                Some(_) => AppError::Capacity("Slot is full or no longer available".into()),
                None => AppError::NotFound("Slot not found".into()),
            });
        }

        let consumed = sqlx::query(
            "UPDATE user_packages SET sessions_used = sessions_used + 1
             WHERE id = ? AND user_id = ? AND status = 'active' AND expires_at > ? AND sessions_used < total_sessions"
        )
            .bind(&booking.user_package_id).bind(&booking.user_id).bind(now)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        if consumed.rows_affected() == 0 {
            return Err(AppError::Validation("Package is not active, has expired or has no sessions left".into()));
        }

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, user_id, user_package_id, schedule_slot_id, status, session_type, notes, phone_number, payment_method, reference, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.user_id).bind(&booking.user_package_id).bind(&booking.schedule_slot_id)
            .bind(booking.status.as_str()).bind(&booking.session_type).bind(&booking.notes).bind(&booking.phone_number)
            .bind(booking.payment_method.as_str()).bind(&booking.reference).bind(booking.created_at).bind(booking.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_details(&self, id: &str) -> Result<Option<BookingDetails>, AppError> {
        sqlx::query_as::<_, BookingDetails>(&format!("{} WHERE b.id = ?", SELECT_DETAILS))
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<BookingDetails>, AppError> {
        sqlx::query_as::<_, BookingDetails>(&format!("{} WHERE b.user_id = ? ORDER BY ss.start_time DESC", SELECT_DETAILS))
            .bind(user_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_all(&self, status: Option<BookingStatus>) -> Result<Vec<BookingDetails>, AppError> {
        sqlx::query_as::<_, BookingDetails>(&format!("{} WHERE (?1 IS NULL OR b.status = ?1) ORDER BY ss.start_time DESC", SELECT_DETAILS))
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn cancel(&self, id: &str) -> Result<Booking, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let current = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Booking not found".into()))?;

        let cancelled = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'cancelled', updated_at = ?
             WHERE id = ? AND status IN ('pending', 'confirmed')
             RETURNING *"
        )
            .bind(now).bind(id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::Validation(format!("A {} booking cannot be cancelled", current.status.as_str())))?;

        sqlx::query(
            "UPDATE schedule_slots SET booked_count = CASE WHEN booked_count > 0 THEN booked_count - 1 ELSE 0 END, updated_at = ?
             WHERE id = ?"
        )
            .bind(now).bind(&cancelled.schedule_slot_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        sqlx::query(
            "UPDATE user_packages SET sessions_used = CASE WHEN sessions_used > 0 THEN sessions_used - 1 ELSE 0 END
             WHERE id = ?"
        )
            .bind(&cancelled.user_package_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(cancelled)
    }

    async fn update_status(&self, id: &str, from: BookingStatus, to: BookingStatus) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET status = ?, updated_at = ? WHERE id = ? AND status = ? RETURNING *")
            .bind(to.as_str()).bind(Utc::now()).bind(id).bind(from.as_str())
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::Conflict("Booking status was changed by another request".into()))
    }
}
