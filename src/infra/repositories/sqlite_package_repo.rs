use crate::domain::{models::package::{PackageDefinition, PackagePrice}, ports::PackageRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqlitePackageRepo {
    pool: SqlitePool,
}

impl SqlitePackageRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PackageRepository for SqlitePackageRepo {
    async fn create_definition(&self, definition: &PackageDefinition) -> Result<PackageDefinition, AppError> {
        sqlx::query_as::<_, PackageDefinition>(
            "INSERT INTO package_definitions (id, name, description, sessions_count, session_duration_min, package_type, validity_days, base_price_cents, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&definition.id).bind(&definition.name).bind(&definition.description).bind(definition.sessions_count)
            .bind(definition.session_duration_min).bind(definition.package_type.as_str()).bind(definition.validity_days)
            .bind(definition.base_price_cents).bind(definition.is_active).bind(definition.created_at).bind(definition.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_definition(&self, id: &str) -> Result<Option<PackageDefinition>, AppError> {
        sqlx::query_as::<_, PackageDefinition>("SELECT * FROM package_definitions WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_definitions(&self) -> Result<Vec<PackageDefinition>, AppError> {
        sqlx::query_as::<_, PackageDefinition>("SELECT * FROM package_definitions ORDER BY sessions_count ASC, name ASC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_definition(&self, definition: &PackageDefinition) -> Result<PackageDefinition, AppError> {
        sqlx::query_as::<_, PackageDefinition>(
            "UPDATE package_definitions SET name=?, description=?, sessions_count=?, session_duration_min=?, package_type=?, validity_days=?, base_price_cents=?, is_active=?, updated_at=?
             WHERE id=?
             RETURNING *"
        )
            .bind(&definition.name).bind(&definition.description).bind(definition.sessions_count)
            .bind(definition.session_duration_min).bind(definition.package_type.as_str()).bind(definition.validity_days)
            .bind(definition.base_price_cents).bind(definition.is_active).bind(definition.updated_at)
            .bind(&definition.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Package definition not found".into()))
    }

    async fn delete_definition(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let prices: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM package_prices WHERE package_definition_id = ?").bind(id).fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        let purchased: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_packages WHERE package_definition_id = ?").bind(id).fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        if prices > 0 || purchased > 0 {
            return Err(AppError::ReferentialIntegrity(format!(
                "Package has {} price(s) and {} purchase(s); deactivate it instead", prices, purchased
            )));
        }
        let result = sqlx::query("DELETE FROM package_definitions WHERE id = ?").bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Package definition not found".into())); }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn create_price(&self, price: &PackagePrice) -> Result<PackagePrice, AppError> {
        sqlx::query_as::<_, PackagePrice>(
            "INSERT INTO package_prices (id, package_definition_id, currency_code, amount_cents, pricing_mode, exchange_rate, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&price.id).bind(&price.package_definition_id).bind(&price.currency_code).bind(price.amount_cents)
            .bind(price.pricing_mode.as_str()).bind(price.exchange_rate).bind(price.is_active)
            .bind(price.created_at).bind(price.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_price(&self, id: &str) -> Result<Option<PackagePrice>, AppError> {
        sqlx::query_as::<_, PackagePrice>("SELECT * FROM package_prices WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_prices(&self, definition_id: Option<&str>) -> Result<Vec<PackagePrice>, AppError> {
        sqlx::query_as::<_, PackagePrice>(
            "SELECT * FROM package_prices WHERE (?1 IS NULL OR package_definition_id = ?1) ORDER BY package_definition_id, currency_code"
        )
            .bind(definition_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_price(&self, price: &PackagePrice) -> Result<PackagePrice, AppError> {
        sqlx::query_as::<_, PackagePrice>(
            "UPDATE package_prices SET currency_code=?, amount_cents=?, pricing_mode=?, exchange_rate=?, is_active=?, updated_at=?
             WHERE id=?
             RETURNING *"
        )
            .bind(&price.currency_code).bind(price.amount_cents).bind(price.pricing_mode.as_str())
            .bind(price.exchange_rate).bind(price.is_active).bind(price.updated_at)
            .bind(&price.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Package price not found".into()))
    }

    async fn delete_price(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM package_prices WHERE id = ?").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Package price not found".into())); }
        Ok(())
    }
}
