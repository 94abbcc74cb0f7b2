use crate::domain::{models::teacher::Teacher, ports::TeacherRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresTeacherRepo {
    pool: PgPool,
}

impl PostgresTeacherRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeacherRepository for PostgresTeacherRepo {
    async fn create(&self, teacher: &Teacher) -> Result<Teacher, AppError> {
        sqlx::query_as::<_, Teacher>(
            "INSERT INTO teachers (id, name, email, phone, bio, specialties, languages, venue_id, is_active, featured, display_order, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING *"
        )
            .bind(&teacher.id).bind(&teacher.name).bind(&teacher.email).bind(&teacher.phone).bind(&teacher.bio)
            .bind(&teacher.specialties).bind(&teacher.languages).bind(&teacher.venue_id).bind(teacher.is_active)
            .bind(teacher.featured).bind(teacher.display_order).bind(teacher.created_at).bind(teacher.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Teacher>, AppError> {
        sqlx::query_as::<_, Teacher>("SELECT * FROM teachers WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Teacher>, AppError> {
        sqlx::query_as::<_, Teacher>("SELECT * FROM teachers ORDER BY featured DESC, display_order ASC, name ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, teacher: &Teacher) -> Result<Teacher, AppError> {
        sqlx::query_as::<_, Teacher>(
            "UPDATE teachers SET name=$1, email=$2, phone=$3, bio=$4, specialties=$5, languages=$6, venue_id=$7, is_active=$8, featured=$9, display_order=$10, updated_at=$11
             WHERE id=$12
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
        let schedules: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schedules WHERE teacher_id = $1").bind(id).fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        if schedules > 0 {
            return Err(AppError::ReferentialIntegrity(format!(
                "Teacher is used by {} schedule(s); deactivate the teacher instead", schedules
            )));
        }
        let result = sqlx::query("DELETE FROM teachers WHERE id = $1").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Teacher not found".into())); }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
