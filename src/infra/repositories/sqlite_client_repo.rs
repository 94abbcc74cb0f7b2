use crate::domain::{models::{client::{Client, ClientListing}, package::UserPackage}, ports::ClientRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteClientRepo {
    pool: SqlitePool,
}

impl SqliteClientRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientRepository for SqliteClientRepo {
    async fn create(&self, client: &Client) -> Result<Client, AppError> {
        sqlx::query_as::<_, Client>(
            "INSERT INTO users (id, name, email, phone, birth_date, birth_place, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&client.id).bind(&client.name).bind(&client.email).bind(&client.phone).bind(client.birth_date)
            .bind(&client.birth_place).bind(client.status.as_str()).bind(client.created_at).bind(client.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Client>, AppError> {
        sqlx::query_as::<_, Client>("SELECT * FROM users WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, search: Option<&str>) -> Result<Vec<ClientListing>, AppError> {
        let pattern = search.map(|s| format!("%{}%", s.trim().to_lowercase()));
        sqlx::query_as::<_, ClientListing>(
            "SELECT u.*,
                    (SELECT COUNT(*) FROM bookings b WHERE b.user_id = u.id AND b.status != 'cancelled') AS booking_count
             FROM users u
             WHERE (?1 IS NULL OR LOWER(u.name) LIKE ?1 OR LOWER(u.email) LIKE ?1)
             ORDER BY u.created_at DESC"
        )
            .bind(pattern)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn booking_count(&self, id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE user_id = ? AND status != 'cancelled'")
            .bind(id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn create_user_package(&self, package: &UserPackage) -> Result<UserPackage, AppError> {
        sqlx::query_as::<_, UserPackage>(
            "INSERT INTO user_packages (id, user_id, package_definition_id, package_name, total_sessions, sessions_used, expires_at, status, purchased_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&package.id).bind(&package.user_id).bind(&package.package_definition_id).bind(&package.package_name)
            .bind(package.total_sessions).bind(package.sessions_used).bind(package.expires_at)
            .bind(package.status.as_str()).bind(package.purchased_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_user_package(&self, id: &str) -> Result<Option<UserPackage>, AppError> {
        sqlx::query_as::<_, UserPackage>("SELECT * FROM user_packages WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_user_packages(&self, user_id: &str) -> Result<Vec<UserPackage>, AppError> {
        sqlx::query_as::<_, UserPackage>("SELECT * FROM user_packages WHERE user_id = ? ORDER BY expires_at ASC")
            .bind(user_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
