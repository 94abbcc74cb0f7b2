use crate::domain::{models::teacher::Teacher, ports::TeacherRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteTeacherRepo {
    pool: SqlitePool,
}

impl SqliteTeacherRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeacherRepository for SqliteTeacherRepo {
    async fn create(&self, teacher: &Teacher) -> Result<Teacher, AppError> {
        sqlx::query_as::<_, Teacher>(
            "INSERT INTO teachers (id, name, email, phone, bio, specialties, languages, venue_id, is_active, featured, display_order, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&teacher.id).bind(&teacher.name).bind(&teacher.email).bind(&teacher.phone).bind(&teacher.bio)
            .bind(&teacher.specialties).bind(&teacher.languages).bind(&teacher.venue_id).bind(teacher.is_active)
            .bind(teacher.featured).bind(teacher.display_order).bind(teacher.created_at).bind(teacher.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Teacher>, AppError> {
        sqlx::query_as::<_, Teacher>("SELECT * FROM teachers WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Teacher>, AppError> {
        sqlx::query_as::<_, Teacher>("SELECT * FROM teachers ORDER BY featured DESC, display_order ASC, name ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, teacher: &Teacher) -> Result<Teacher, AppError> {
        sqlx::query_as::<_, Teacher>(
            "UPDATE teachers SET name=?, email=?, phone=?, bio=?, specialties=?, languages=?, venue_id=?, is_active=?, featured=?, display_order=?, updated_at=?
             WHERE id=?
             RETURNING *"
        )
            .bind(&teacher.name).bind(&teacher.email).bind(&teacher.phone).bind(&teacher.bio)
            .bind(&teacher.specialties).bind(&teacher.languages).bind(&teacher.venue_id).bind(teacher.is_active)
            .bind(teacher.featured).bind(teacher.display_order).bind(teacher.updated_at)
            .bind(&teacher.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Teacher not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let schedules: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schedules WHERE teacher_id = ?").bind(id).fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        if schedules > 0 {
            return Err(AppError::ReferentialIntegrity(format!(
                "Teacher is used by {} schedule(s); deactivate the teacher instead", schedules
            )));
        }
        let result = sqlx::query("DELETE FROM teachers WHERE id = ?").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Teacher not found".into())); }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
