use crate::domain::{models::service_type::ServiceType, ports::ServiceTypeRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteServiceTypeRepo {
    pool: SqlitePool,
}

impl SqliteServiceTypeRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceTypeRepository for SqliteServiceTypeRepo {
    async fn create(&self, service_type: &ServiceType) -> Result<ServiceType, AppError> {
        sqlx::query_as::<_, ServiceType>(
            "INSERT INTO service_types (id, name, description, category, duration_min, min_participants, max_participants, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&service_type.id).bind(&service_type.name).bind(&service_type.description)
            .bind(service_type.category.as_str()).bind(service_type.duration_min).bind(service_type.min_participants)
            .bind(service_type.max_participants).bind(service_type.is_active)
            .bind(service_type.created_at).bind(service_type.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ServiceType>, AppError> {
        sqlx::query_as::<_, ServiceType>("SELECT * FROM service_types WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<ServiceType>, AppError> {
        sqlx::query_as::<_, ServiceType>("SELECT * FROM service_types ORDER BY category ASC, name ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, service_type: &ServiceType) -> Result<ServiceType, AppError> {
        sqlx::query_as::<_, ServiceType>(
            "UPDATE service_types SET name=?, description=?, category=?, duration_min=?, min_participants=?, max_participants=?, is_active=?, updated_at=?
             WHERE id=?
             RETURNING *"
        )
            .bind(&service_type.name).bind(&service_type.description).bind(service_type.category.as_str())
            .bind(service_type.duration_min).bind(service_type.min_participants).bind(service_type.max_participants)
            .bind(service_type.is_active).bind(service_type.updated_at)
            .bind(&service_type.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Service type not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let schedules: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schedules WHERE service_type_id = ?").bind(id).fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        if schedules > 0 {
            return Err(AppError::ReferentialIntegrity(format!(
                "Service type is used by {} schedule(s); deactivate it instead", schedules
            )));
        }
        let result = sqlx::query("DELETE FROM service_types WHERE id = ?").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Service type not found".into())); }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
