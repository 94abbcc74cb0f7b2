use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::error::AppError;
use crate::state::AppState;
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_client_repo::PostgresClientRepo,
    postgres_package_repo::PostgresPackageRepo, postgres_schedule_repo::PostgresScheduleRepo,
    postgres_service_type_repo::PostgresServiceTypeRepo, postgres_slot_repo::PostgresSlotRepo,
    postgres_teacher_repo::PostgresTeacherRepo, postgres_venue_repo::PostgresVenueRepo,
    sqlite_booking_repo::SqliteBookingRepo, sqlite_client_repo::SqliteClientRepo,
    sqlite_package_repo::SqlitePackageRepo, sqlite_schedule_repo::SqliteScheduleRepo,
    sqlite_service_type_repo::SqliteServiceTypeRepo, sqlite_slot_repo::SqliteSlotRepo,
    sqlite_teacher_repo::SqliteTeacherRepo, sqlite_venue_repo::SqliteVenueRepo,
};

/// Connects to the database named by `DATABASE_URL`, migrates it and wires the repositories.
pub async fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    let database_url = &config.database_url;

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().map_err(AppError::Database)?;
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await?;

        run_postgres_migrations(&pool).await?;

        Ok(AppState {
            config: config.clone(),
            teacher_repo: Arc::new(PostgresTeacherRepo::new(pool.clone())),
            venue_repo: Arc::new(PostgresVenueRepo::new(pool.clone())),
            service_type_repo: Arc::new(PostgresServiceTypeRepo::new(pool.clone())),
            package_repo: Arc::new(PostgresPackageRepo::new(pool.clone())),
            client_repo: Arc::new(PostgresClientRepo::new(pool.clone())),
            schedule_repo: Arc::new(PostgresScheduleRepo::new(pool.clone())),
            slot_repo: Arc::new(PostgresSlotRepo::new(pool.clone())),
            booking_repo: Arc::new(PostgresBookingRepo::new(pool)),
        })
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true)
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        run_sqlite_migrations(&pool).await?;

        Ok(AppState {
            config: config.clone(),
            teacher_repo: Arc::new(SqliteTeacherRepo::new(pool.clone())),
            venue_repo: Arc::new(SqliteVenueRepo::new(pool.clone())),
            service_type_repo: Arc::new(SqliteServiceTypeRepo::new(pool.clone())),
            package_repo: Arc::new(SqlitePackageRepo::new(pool.clone())),
            client_repo: Arc::new(SqliteClientRepo::new(pool.clone())),
            schedule_repo: Arc::new(SqliteScheduleRepo::new(pool.clone())),
            slot_repo: Arc::new(SqliteSlotRepo::new(pool.clone())),
            booking_repo: Arc::new(SqliteBookingRepo::new(pool)),
        })
    }
}

async fn run_postgres_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/postgres").run(pool).await?;
    info!("Postgres migrations applied");
    Ok(())
}

async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/sqlite").run(pool).await?;
    info!("SQLite migrations applied");
    Ok(())
}
