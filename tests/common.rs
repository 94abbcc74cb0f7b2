use studio_booking::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::auth::Claims,
    domain::services::conflicts::VenuePolicy,
    infra::repositories::{
        sqlite_booking_repo::SqliteBookingRepo,
        sqlite_client_repo::SqliteClientRepo,
        sqlite_package_repo::SqlitePackageRepo,
        sqlite_schedule_repo::SqliteScheduleRepo,
        sqlite_service_type_repo::SqliteServiceTypeRepo,
        sqlite_slot_repo::SqliteSlotRepo,
        sqlite_teacher_repo::SqliteTeacherRepo,
        sqlite_venue_repo::SqliteVenueRepo,
    },
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use chrono::{Datelike, NaiveDate, Utc, Weekday};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::str::FromStr;
use tower::ServiceExt;
use serde_json::{json, Value};

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_ISSUER: &str = "test-issuer";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_policy(VenuePolicy::Advisory).await
    }

    pub async fn with_policy(policy: VenuePolicy) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret: TEST_SECRET.to_string(),
            auth_issuer: TEST_ISSUER.to_string(),
            studio_timezone: chrono_tz::America::Lima,
            venue_conflict_policy: policy,
            slot_horizon_weeks: 4,
            slot_worker_interval_secs: 3600,
        };

        let state = Arc::new(AppState {
            config,
            teacher_repo: Arc::new(SqliteTeacherRepo::new(pool.clone())),
            venue_repo: Arc::new(SqliteVenueRepo::new(pool.clone())),
            service_type_repo: Arc::new(SqliteServiceTypeRepo::new(pool.clone())),
            package_repo: Arc::new(SqlitePackageRepo::new(pool.clone())),
            client_repo: Arc::new(SqliteClientRepo::new(pool.clone())),
            schedule_repo: Arc::new(SqliteScheduleRepo::new(pool.clone())),
            slot_repo: Arc::new(SqliteSlotRepo::new(pool.clone())),
            booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub fn token_with(&self, user_id: &str, role: &str, issuer: &str) -> String {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            iss: issuer.to_string(),
            sub: user_id.to_string(),
            exp: now + 3600,
            iat: now,
            role: role.to_string(),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_SECRET.as_bytes())).unwrap()
    }

    pub fn admin_token(&self) -> String {
        self.token_with("admin-1", "ADMIN", TEST_ISSUER)
    }

    pub fn client_token(&self, user_id: &str) -> String {
        self.token_with(user_id, "CLIENT", TEST_ISSUER)
    }

    pub fn build_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    /// Sends a request through the router and parses the body as JSON (`Null` when it is not JSON).
    pub async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.router.clone()
            .oneshot(Self::build_request(method, uri, token, body))
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn admin(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let token = self.admin_token();
        self.send(method, uri, Some(&token), body).await
    }

    async fn created_id(&self, uri: &str, body: Value) -> String {
        let (status, json) = self.admin("POST", uri, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "POST {} failed: {}", uri, json);
        json["data"]["id"].as_str().unwrap().to_string()
    }

    pub async fn create_venue(&self, name: &str, capacity: i32) -> String {
        self.created_id("/api/admin/venues", json!({ "name": name, "capacity": capacity })).await
    }

    pub async fn create_teacher(&self, name: &str, venue_id: Option<&str>) -> String {
        self.created_id("/api/admin/teachers", json!({ "name": name, "venueId": venue_id })).await
    }

    pub async fn create_service_type(&self, name: &str, duration_min: i32) -> String {
        self.created_id(
            "/api/admin/service-types",
            json!({ "name": name, "category": "class", "durationMin": duration_min }),
        ).await
    }

    pub async fn create_package(&self, name: &str, sessions: i32, base_price_cents: i64) -> String {
        self.created_id(
            "/api/admin/package-definitions",
            json!({
                "name": name,
                "sessionsCount": sessions,
                "sessionDurationMin": 60,
                "validityDays": 30,
                "basePriceCents": base_price_cents
            }),
        ).await
    }

    pub async fn create_client(&self, name: &str, email: &str) -> String {
        self.created_id("/api/admin/clients", json!({ "name": name, "email": email })).await
    }

    pub async fn grant_package(&self, user_id: &str, definition_id: &str) -> String {
        self.created_id(
            "/api/admin/user-packages",
            json!({ "userId": user_id, "packageDefinitionId": definition_id }),
        ).await
    }

    /// Creates schedules and returns their ids in weekday order.
    pub async fn create_schedules(&self, body: Value) -> Vec<String> {
        let (status, json) = self.admin("POST", "/api/admin/unified-schedules", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "schedule creation failed: {}", json);
        json["schedules"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap().to_string())
            .collect()
    }

    /// Generates slots and returns the slot list of the schedule.
    pub async fn generate_slots(&self, schedule_id: &str, from: NaiveDate, to: NaiveDate) -> Vec<Value> {
        let (status, json) = self.admin(
            "POST",
            &format!("/api/admin/unified-schedules/{}/slots", schedule_id),
            Some(json!({ "from": from, "to": to })),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "slot generation failed: {}", json);
        json["slots"].as_array().unwrap().clone()
    }

    pub async fn schedule_slots(&self, schedule_id: &str) -> Vec<Value> {
        let (status, json) = self.admin("GET", &format!("/api/admin/unified-schedules/{}/slots", schedule_id), None).await;
        assert_eq!(status, StatusCode::OK);
        json["slots"].as_array().unwrap().clone()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

#[allow(dead_code)]
pub fn studio_today() -> NaiveDate {
    Utc::now().with_timezone(&chrono_tz::America::Lima).date_naive()
}

/// The first `weekday` strictly after today in the studio timezone, so its slots lie in the future.
#[allow(dead_code)]
pub fn upcoming(weekday: Weekday) -> NaiveDate {
    let mut date = studio_today().succ_opt().unwrap();
    while date.weekday() != weekday {
        date = date.succ_opt().unwrap();
    }
    date
}
