mod common;

use axum::http::{header, StatusCode};
use chrono::{NaiveDate, Utc, Weekday};
use common::{upcoming, TestApp};
use serde_json::{json, Value};
use studio_booking::domain::models::booking::{Booking, PaymentMethod};
use studio_booking::domain::models::package::UserPackageSummary;
use studio_booking::domain::models::slot::SlotAvailability;
use studio_booking::domain::services::booking_flow::{BookingFlow, BookingStep, CustomerDetails};
use tokio::task::JoinSet;
use tower::ServiceExt;

struct Studio {
    schedule_id: String,
    slot_id: String,
    package_definition_id: String,
    date: NaiveDate,
}

/// Teacher class on the next Monday 13:15-14:15 with the given capacity, plus a bookable package.
async fn seed_studio(app: &TestApp, capacity: i32, sessions: i32) -> Studio {
    let venue = app.create_venue("Sala Sol", 15).await;
    let teacher = app.create_teacher("Ana", Some(&venue)).await;
    let hatha = app.create_service_type("Hatha", 60).await;
    let package_definition_id = app.create_package("04 MATPASS", sessions, 19000).await;

    let (status, price) = app.admin("POST", "/api/admin/package-prices", Some(json!({
        "packageDefinitionId": package_definition_id,
        "currencyCode": "PEN",
        "pricingMode": "custom",
        "amountCents": 19000
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(price["data"]["amountCents"], 19000);

    let ids = app.create_schedules(json!({
        "type": "teacher", "teacherId": teacher, "venueId": venue, "serviceTypeId": hatha,
        "dayOfWeek": "Monday", "startTime": "13:15", "endTime": "14:15", "maxBookings": capacity
    })).await;

    let date = upcoming(Weekday::Mon);
    let slots = app.generate_slots(&ids[0], date, date).await;

    Studio {
        schedule_id: ids[0].clone(),
        slot_id: slots[0]["id"].as_str().unwrap().to_string(),
        package_definition_id,
        date,
    }
}

async fn customer(app: &TestApp, studio: &Studio, name: &str, email: &str) -> (String, String, String) {
    let user_id = app.create_client(name, email).await;
    let package_id = app.grant_package(&user_id, &studio.package_definition_id).await;
    let token = app.client_token(&user_id);
    (user_id, package_id, token)
}

fn booking_body(package_id: &str, slot_id: &str, payment: &str) -> Value {
    json!({
        "userPackageId": package_id,
        "scheduleSlotId": slot_id,
        "paymentMethod": payment
    })
}

async fn slot_state(app: &TestApp, studio: &Studio) -> Value {
    app.schedule_slots(&studio.schedule_id).await
        .into_iter()
        .find(|s| s["id"] == studio.slot_id.as_str())
        .unwrap()
}

#[tokio::test]
async fn test_matpass_booking_through_the_flow() {
    let app = TestApp::new().await;
    let studio = seed_studio(&app, 15, 4).await;
    let (_, package_id, token) = customer(&app, &studio, "María Quispe", "maria@example.com").await;

    let (status, packages) = app.send("GET", "/api/client/packages", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let packages: Vec<UserPackageSummary> = serde_json::from_value(packages["packages"].clone()).unwrap();
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0].name, "04 MATPASS");
    assert_eq!(packages[0].sessions_remaining, 4);

    let mut flow = BookingFlow::new(Utc::now(), chrono_tz::America::Lima, packages);
    flow.select_package(&package_id).unwrap();
    assert_eq!(flow.next().unwrap(), BookingStep::SelectSchedule);

    let (_, listing) = app.send(
        "GET",
        &format!("/api/teacher-schedule-slots?from={}&to={}", studio.date, studio.date),
        Some(&token),
        None,
    ).await;
    let slots: Vec<SlotAvailability> = serde_json::from_value(listing["slots"].clone()).unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].capacity, 15);
    flow.load_slots(slots);
    flow.reveal_other_dates();

    assert_eq!(flow.select_slot(&studio.slot_id).unwrap(), BookingStep::EnterDetails);
    flow.set_details(CustomerDetails {
        name: "María Quispe".into(),
        email: "maria@example.com".into(),
        phone: Some("+51 999 888 777".into()),
        birth_date: NaiveDate::from_ymd_opt(1990, 4, 12),
        birth_place: "Cusco".into(),
        question: "First class, any advice?".into(),
        special_requests: None,
    });
    assert_eq!(flow.next().unwrap(), BookingStep::Payment);
    flow.choose_payment(PaymentMethod::Card).unwrap();

    let request = flow.booking_request().unwrap();
    assert_eq!(request.session_type.as_deref(), Some("Hatha"));

    let (status, created) = app.send("POST", "/api/client/bookings", Some(&token), Some(serde_json::to_value(&request).unwrap())).await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    let booking: Booking = serde_json::from_value(created["booking"].clone()).unwrap();
    assert_eq!(booking.reference.len(), 8);
    assert_eq!(created["booking"]["status"], "confirmed");

    assert_eq!(flow.booking_succeeded(booking).unwrap(), BookingStep::Success);

    assert_eq!(slot_state(&app, &studio).await["bookedCount"], 1);

    let (_, packages) = app.send("GET", "/api/client/packages", Some(&token), None).await;
    assert_eq!(packages["packages"][0]["sessionsRemaining"], 3);

    let (_, mine) = app.send("GET", "/api/client/bookings", Some(&token), None).await;
    let mine = mine["bookings"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["teacherName"], "Ana");
    assert_eq!(mine[0]["packageName"], "04 MATPASS");
}

#[tokio::test]
async fn test_full_slot_is_rejected() {
    let app = TestApp::new().await;
    let studio = seed_studio(&app, 1, 4).await;
    let (_, first_package, first_token) = customer(&app, &studio, "First", "first@example.com").await;
    let (_, second_package, second_token) = customer(&app, &studio, "Second", "second@example.com").await;

    let (status, _) = app.send("POST", "/api/client/bookings", Some(&first_token), Some(booking_body(&first_package, &studio.slot_id, "card"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.send("POST", "/api/client/bookings", Some(&second_token), Some(booking_body(&second_package, &studio.slot_id, "card"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "capacity_exceeded");

    let slot = slot_state(&app, &studio).await;
    assert_eq!(slot["bookedCount"], 1);

    // The rejected customer keeps their session.
    let (_, packages) = app.send("GET", "/api/client/packages", Some(&second_token), None).await;
    assert_eq!(packages["packages"][0]["sessionsRemaining"], 4);
}

#[tokio::test]
async fn test_concurrent_bookings_for_last_seat() {
    let app = TestApp::new().await;
    let studio = seed_studio(&app, 1, 4).await;

    let mut requests = Vec::new();
    for i in 0..2 {
        let (_, package_id, token) = customer(&app, &studio, &format!("Racer {}", i), &format!("racer{}@example.com", i)).await;
        requests.push(TestApp::build_request(
            "POST",
            "/api/client/bookings",
            Some(&token),
            Some(booking_body(&package_id, &studio.slot_id, "card")),
        ));
    }

    let mut set = JoinSet::new();
    for request in requests {
        let router = app.router.clone();
        set.spawn(async move { router.oneshot(request).await.unwrap().status() });
    }

    let mut statuses = Vec::new();
    while let Some(status) = set.join_next().await {
        statuses.push(status.unwrap());
    }

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count(), 1);
    assert_eq!(slot_state(&app, &studio).await["bookedCount"], 1);
}

#[tokio::test]
async fn test_cancellation_releases_seat_once() {
    let app = TestApp::new().await;
    let studio = seed_studio(&app, 5, 4).await;
    let (_, package_id, token) = customer(&app, &studio, "Lucía", "lucia@example.com").await;

    let (_, created) = app.send("POST", "/api/client/bookings", Some(&token), Some(booking_body(&package_id, &studio.slot_id, "card"))).await;
    let booking_id = created["booking"]["id"].as_str().unwrap().to_string();
    assert_eq!(slot_state(&app, &studio).await["bookedCount"], 1);

    let cancel_uri = format!("/api/client/bookings/{}/cancel", booking_id);
    let (status, cancelled) = app.send("POST", &cancel_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["booking"]["status"], "cancelled");

    let (status, again) = app.send("POST", &cancel_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(again["error"], "validation_error");

    assert_eq!(slot_state(&app, &studio).await["bookedCount"], 0);
    let (_, packages) = app.send("GET", "/api/client/packages", Some(&token), None).await;
    assert_eq!(packages["packages"][0]["sessionsRemaining"], 4);
}

#[tokio::test]
async fn test_exhausted_package_cannot_book() {
    let app = TestApp::new().await;
    let studio = seed_studio(&app, 5, 1).await;
    let (_, package_id, token) = customer(&app, &studio, "Solo", "solo@example.com").await;

    let (status, _) = app.send("POST", "/api/client/bookings", Some(&token), Some(booking_body(&package_id, &studio.slot_id, "card"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.send("POST", "/api/client/bookings", Some(&token), Some(booking_body(&package_id, &studio.slot_id, "card"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(slot_state(&app, &studio).await["bookedCount"], 1);
}

#[tokio::test]
async fn test_booking_without_payment_method_defaults_to_card() {
    let app = TestApp::new().await;
    let studio = seed_studio(&app, 5, 4).await;
    let (_, package_id, token) = customer(&app, &studio, "Lucía", "lucia@example.com").await;

    let (status, created) = app.send("POST", "/api/client/bookings", Some(&token), Some(json!({
        "scheduleSlotId": studio.slot_id,
        "userPackageId": package_id,
        "sessionType": "Hatha",
        "notes": "Bringing my own mat",
        "phoneNumber": "+51 999 111 222"
    }))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["booking"]["status"], "confirmed");
    assert_eq!(created["booking"]["paymentMethod"], "card");
    assert_eq!(created["booking"]["notes"], "Bringing my own mat");
    assert_eq!(slot_state(&app, &studio).await["bookedCount"], 1);

    let (status, body) = app.send("POST", "/api/client/bookings", Some(&token), Some(json!({
        "userPackageId": package_id
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_deactivated_schedule_closes_its_slots() {
    let app = TestApp::new().await;
    let studio = seed_studio(&app, 5, 4).await;
    let (_, package_id, token) = customer(&app, &studio, "Pilar", "pilar@example.com").await;
    let schedule_uri = format!("/api/admin/unified-schedules/{}", studio.schedule_id);

    let (status, updated) = app.admin("PUT", &schedule_uri, Some(json!({ "isAvailable": false }))).await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(slot_state(&app, &studio).await["isAvailable"], false);

    let (status, body) = app.send("POST", "/api/client/bookings", Some(&token), Some(booking_body(&package_id, &studio.slot_id, "card"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "capacity_exceeded");
    assert_eq!(slot_state(&app, &studio).await["bookedCount"], 0);
    let (_, packages) = app.send("GET", "/api/client/packages", Some(&token), None).await;
    assert_eq!(packages["packages"][0]["sessionsRemaining"], 4);

    let (status, _) = app.admin("PUT", &schedule_uri, Some(json!({ "isAvailable": true }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slot_state(&app, &studio).await["isAvailable"], true);

    let (status, _) = app.send("POST", "/api/client/bookings", Some(&token), Some(booking_body(&package_id, &studio.slot_id, "card"))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_reservation_checks_schedule_availability() {
    let app = TestApp::new().await;
    let studio = seed_studio(&app, 5, 4).await;
    let (_, package_id, token) = customer(&app, &studio, "Inés", "ines@example.com").await;

    // Slot flag left open while its schedule is switched off underneath.
    sqlx::query("UPDATE schedules SET is_available = 0 WHERE id = ?")
        .bind(&studio.schedule_id)
        .execute(&app.pool)
        .await
        .unwrap();
    assert_eq!(slot_state(&app, &studio).await["isAvailable"], true);

    let (status, body) = app.send("POST", "/api/client/bookings", Some(&token), Some(booking_body(&package_id, &studio.slot_id, "card"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "capacity_exceeded");
    assert_eq!(slot_state(&app, &studio).await["bookedCount"], 0);
}

#[tokio::test]
async fn test_bookings_are_private_to_their_owner() {
    let app = TestApp::new().await;
    let studio = seed_studio(&app, 5, 4).await;
    let (_, package_id, owner) = customer(&app, &studio, "Owner", "owner@example.com").await;
    let (_, _, stranger) = customer(&app, &studio, "Stranger", "stranger@example.com").await;

    let (_, created) = app.send("POST", "/api/client/bookings", Some(&owner), Some(booking_body(&package_id, &studio.slot_id, "card"))).await;
    let booking_id = created["booking"]["id"].as_str().unwrap().to_string();

    let (status, _) = app.send("POST", &format!("/api/client/bookings/{}/cancel", booking_id), Some(&stranger), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A package that belongs to someone else cannot be used.
    let (status, _) = app.send("POST", "/api/client/bookings", Some(&stranger), Some(booking_body(&package_id, &studio.slot_id, "card"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, stranger_bookings) = app.send("GET", "/api/client/bookings", Some(&stranger), None).await;
    assert!(stranger_bookings["bookings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_confirms_cash_bookings() {
    let app = TestApp::new().await;
    let studio = seed_studio(&app, 5, 4).await;
    let (_, package_id, token) = customer(&app, &studio, "Cash", "cash@example.com").await;

    let (_, created) = app.send("POST", "/api/client/bookings", Some(&token), Some(booking_body(&package_id, &studio.slot_id, "cash"))).await;
    assert_eq!(created["booking"]["status"], "pending");
    let booking_id = created["booking"]["id"].as_str().unwrap().to_string();

    let (_, pending) = app.admin("GET", "/api/admin/bookings?status=pending", None).await;
    assert_eq!(pending["bookings"].as_array().unwrap().len(), 1);

    let status_uri = format!("/api/admin/bookings/{}/status", booking_id);
    let (status, confirmed) = app.admin("PUT", &status_uri, Some(json!({ "status": "confirmed" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["booking"]["status"], "confirmed");

    let (status, _) = app.admin("PUT", &status_uri, Some(json!({ "status": "pending" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, completed) = app.admin("PUT", &status_uri, Some(json!({ "status": "completed" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["booking"]["status"], "completed");

    // Completed bookings keep their seat.
    assert_eq!(slot_state(&app, &studio).await["bookedCount"], 1);

    let (status, _) = app.send("POST", &format!("/api/client/bookings/{}/cancel", booking_id), Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_cancellation_releases_seat() {
    let app = TestApp::new().await;
    let studio = seed_studio(&app, 5, 4).await;
    let (_, package_id, token) = customer(&app, &studio, "Late", "late@example.com").await;

    let (_, created) = app.send("POST", "/api/client/bookings", Some(&token), Some(booking_body(&package_id, &studio.slot_id, "card"))).await;
    let booking_id = created["booking"]["id"].as_str().unwrap().to_string();

    let (status, cancelled) = app.admin("PUT", &format!("/api/admin/bookings/{}/status", booking_id), Some(json!({ "status": "cancelled" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["booking"]["status"], "cancelled");
    assert_eq!(slot_state(&app, &studio).await["bookedCount"], 0);
}

#[tokio::test]
async fn test_booking_exports_as_icalendar() {
    let app = TestApp::new().await;
    let studio = seed_studio(&app, 5, 4).await;
    let (_, package_id, token) = customer(&app, &studio, "Ical", "ical@example.com").await;

    let (_, created) = app.send("POST", "/api/client/bookings", Some(&token), Some(booking_body(&package_id, &studio.slot_id, "card"))).await;
    let booking_id = created["booking"]["id"].as_str().unwrap();
    let reference = created["booking"]["reference"].as_str().unwrap();

    let response = app.router.clone()
        .oneshot(TestApp::build_request("GET", &format!("/api/client/bookings/{}/ics", booking_id), Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/calendar"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let ics = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(ics.contains("BEGIN:VCALENDAR"));
    assert!(ics.contains("BEGIN:VEVENT"));
    assert!(ics.contains(reference));
}

#[tokio::test]
async fn test_client_summary_counts_bookings() {
    let app = TestApp::new().await;
    let studio = seed_studio(&app, 5, 4).await;
    let (user_id, package_id, token) = customer(&app, &studio, "Regular", "regular@example.com").await;

    let (_, first) = app.send("POST", "/api/client/bookings", Some(&token), Some(booking_body(&package_id, &studio.slot_id, "card"))).await;
    assert_eq!(first["success"], true);
    let (_, second) = app.send("POST", "/api/client/bookings", Some(&token), Some(booking_body(&package_id, &studio.slot_id, "card"))).await;
    assert_eq!(second["success"], true);

    let (status, summary) = app.admin("GET", &format!("/api/admin/clients/{}/summary", user_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["data"]["bookingCount"], 2);
    assert_eq!(summary["data"]["isRecurrent"], true);
    assert_eq!(summary["data"]["packages"][0]["sessionsRemaining"], 2);

    let (_, clients) = app.admin("GET", "/api/admin/clients?search=regular", None).await;
    let clients = clients["data"].as_array().unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0]["isRecurrent"], true);
    assert_eq!(clients[0]["bookingCount"], 2);
}
