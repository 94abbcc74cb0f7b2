mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{TestApp, TEST_ISSUER};
use serde_json::{json, Value};
use tower::ServiceExt;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;
    let (status, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_admin_routes_require_admin_session() {
    let app = TestApp::new().await;

    let (status, body) = app.send("GET", "/api/admin/teachers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let client = app.client_token("someone");
    let (status, body) = app.send("GET", "/api/admin/unified-schedules", Some(&client), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let foreign = app.token_with("admin-1", "ADMIN", "someone-else");
    let (status, _) = app.send("GET", "/api/admin/teachers", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send("GET", "/api/client/bookings", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let unknown_role = app.token_with("x", "TEACHER", TEST_ISSUER);
    let (status, _) = app.send("GET", "/api/client/packages", Some(&unknown_role), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Availability is public.
    let (status, _) = app.send("GET", "/api/teacher-schedule-slots", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_teacher_crud() {
    let app = TestApp::new().await;

    let (status, created) = app.admin("POST", "/api/admin/teachers", Some(json!({
        "name": "Ana Torres",
        "email": "ana@studio.pe",
        "specialties": ["hatha", "yin"],
        "languages": ["es", "en"],
        "featured": true
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["specialties"], json!(["hatha", "yin"]));
    assert_eq!(created["data"]["isActive"], true);
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/admin/teachers/{}", id);

    let (status, updated) = app.admin("PUT", &uri, Some(json!({ "isActive": false, "bio": "Ten years of practice" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["isActive"], false);
    assert_eq!(updated["data"]["bio"], "Ten years of practice");
    assert_eq!(updated["data"]["name"], "Ana Torres");

    let (_, list) = app.admin("GET", "/api/admin/teachers", None).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    let (status, _) = app.admin("POST", "/api/admin/teachers", Some(json!({ "name": "Bad", "email": "not-an-email" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.admin("POST", "/api/admin/teachers", Some(json!({ "name": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, deleted) = app.admin("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["success"], true);

    let (status, _) = app.admin("GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_blocked_while_referenced() {
    let app = TestApp::new().await;
    let venue = app.create_venue("Sala Sol", 20).await;
    let teacher = app.create_teacher("Ana", Some(&venue)).await;

    let (status, body) = app.admin("DELETE", &format!("/api/admin/venues/{}", venue), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "referential_integrity");

    let ids = app.create_schedules(json!({
        "type": "teacher", "teacherId": teacher, "dayOfWeek": "Friday",
        "startTime": "17:00", "endTime": "18:00", "maxBookings": 10
    })).await;

    let teacher_uri = format!("/api/admin/teachers/{}", teacher);
    let (status, body) = app.admin("DELETE", &teacher_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "referential_integrity");

    app.admin("DELETE", &format!("/api/admin/unified-schedules/{}", ids[0]), None).await;
    let (status, _) = app.admin("DELETE", &teacher_uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.admin("DELETE", &format!("/api/admin/venues/{}", venue), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_inactive_teacher_is_flagged_by_conflict_check() {
    let app = TestApp::new().await;
    let teacher = app.create_teacher("Ana", None).await;
    app.admin("PUT", &format!("/api/admin/teachers/{}", teacher), Some(json!({ "isActive": false }))).await;

    let (_, report) = app.admin("POST", "/api/admin/schedule-conflicts", Some(json!({
        "schedule": {
            "type": "teacher", "teacherId": teacher, "dayOfWeek": "Monday",
            "startTime": "09:00", "endTime": "10:00"
        }
    }))).await;
    assert_eq!(report["hasConflicts"], true);
    assert_eq!(report["conflicts"][0]["type"], "teacher_inactive");
}

#[tokio::test]
async fn test_venue_and_service_type_validation() {
    let app = TestApp::new().await;

    let (status, _) = app.admin("POST", "/api/admin/venues", Some(json!({ "name": "Tiny", "capacity": 0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.admin("POST", "/api/admin/service-types", Some(json!({
        "name": "Workshop", "category": "workshop", "durationMin": 120,
        "minParticipants": 10, "maxParticipants": 5
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = app.admin("POST", "/api/admin/service-types", Some(json!({
        "name": "Teacher training", "category": "training_program", "durationMin": 180, "maxParticipants": 12
    }))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["data"]["category"], "training_program");
    assert_eq!(created["data"]["minParticipants"], 1);
}

#[tokio::test]
async fn test_package_prices() {
    let app = TestApp::new().await;
    let definition = app.create_package("04 MATPASS", 4, 19000).await;

    let (status, calculated) = app.admin("POST", "/api/admin/package-prices", Some(json!({
        "packageDefinitionId": definition,
        "currencyCode": "usd",
        "pricingMode": "calculated",
        "exchangeRate": 0.27
    }))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", calculated);
    assert_eq!(calculated["data"]["currencyCode"], "USD");
    assert_eq!(calculated["data"]["amountCents"], 5130);
    let price_id = calculated["data"]["id"].as_str().unwrap().to_string();

    let (status, updated) = app.admin("PUT", &format!("/api/admin/package-prices/{}", price_id), Some(json!({ "exchangeRate": 0.3 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["amountCents"], 5700);

    let (status, _) = app.admin("POST", "/api/admin/package-prices", Some(json!({
        "packageDefinitionId": definition,
        "currencyCode": "PEN",
        "pricingMode": "custom"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, duplicate) = app.admin("POST", "/api/admin/package-prices", Some(json!({
        "packageDefinitionId": definition,
        "currencyCode": "USD",
        "pricingMode": "custom",
        "amountCents": 5000
    }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(duplicate["error"], "conflict");

    let (_, prices) = app.admin("GET", &format!("/api/admin/package-prices?packageDefinitionId={}", definition), None).await;
    assert_eq!(prices["data"].as_array().unwrap().len(), 1);

    let (status, body) = app.admin("DELETE", &format!("/api/admin/package-definitions/{}", definition), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "referential_integrity");

    app.admin("DELETE", &format!("/api/admin/package-prices/{}", price_id), None).await;
    let (status, _) = app.admin("DELETE", &format!("/api/admin/package-definitions/{}", definition), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_clients_and_package_grants() {
    let app = TestApp::new().await;
    let definition = app.create_package("08 MATPASS", 8, 34000).await;

    let (status, created) = app.admin("POST", "/api/admin/clients", Some(json!({
        "name": "Rosa", "email": "Rosa@Example.com", "birthDate": "1992-03-04", "birthPlace": "Arequipa"
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["email"], "rosa@example.com");
    assert_eq!(created["data"]["status"], "active");
    let user_id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, duplicate) = app.admin("POST", "/api/admin/clients", Some(json!({ "name": "Rosa 2", "email": "rosa@example.com" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(duplicate["error"], "conflict");

    let (status, _) = app.admin("POST", "/api/admin/clients", Some(json!({ "name": "Nope", "email": "nope" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, granted) = app.admin("POST", "/api/admin/user-packages", Some(json!({
        "userId": user_id, "packageDefinitionId": definition
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(granted["data"]["totalSessions"], 8);
    assert_eq!(granted["data"]["sessionsUsed"], 0);

    let (status, _) = app.admin("POST", "/api/admin/user-packages", Some(json!({
        "userId": "missing", "packageDefinitionId": definition
    }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, summary) = app.admin("GET", &format!("/api/admin/clients/{}/summary", user_id), None).await;
    assert_eq!(summary["data"]["bookingCount"], 0);
    assert_eq!(summary["data"]["isRecurrent"], false);
    assert_eq!(summary["data"]["packages"][0]["name"], "08 MATPASS");

    let token = app.client_token(&user_id);
    let (_, mine) = app.send("GET", "/api/client/packages", Some(&token), None).await;
    assert_eq!(mine["packages"][0]["sessionsRemaining"], 8);
}

#[tokio::test]
async fn test_malformed_input_uses_error_envelope() {
    let app = TestApp::new().await;

    // Template fields must sit under `schedule`.
    let (status, body) = app.admin("POST", "/api/admin/schedule-conflicts", Some(json!({
        "type": "general", "dayOfWeek": "Monday", "startTime": "09:00", "endTime": "10:00"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].is_string());

    let (status, body) = app.admin("GET", "/api/admin/unified-schedules/calendar?date=not-a-date", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/teachers")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.admin_token()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "validation_error");
}
