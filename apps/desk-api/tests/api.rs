//! HTTP contract tests: the router driven in-process with `oneshot`, over a
//! private in-memory database and a clock frozen on 2026-02-01.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use desk_api::{app, AppState, RequestCounter};
use resort_core::{Clock, FixedClock, RoomCatalog};
use resort_db::{Database, DbConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

// =============================================================================
// Helpers
// =============================================================================

struct TestApp {
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        Self::with(None, 1000).await
    }

    async fn with(api_key: Option<&str>, rate_limit_max: u32) -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::on(
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        ));
        let state = AppState::new(
            db,
            clock,
            RoomCatalog::default(),
            RequestCounter::new(rate_limit_max, Duration::from_secs(60)),
            api_key.map(String::from),
        );
        TestApp { router: app(state) }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request("POST", uri, body)).await
    }

    async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request("PUT", uri, body)).await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::delete(uri).body(Body::empty()).unwrap(),
        )
        .await
    }
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn somchai() -> Value {
    json!({
        "guestName": "Somchai Jaidee",
        "roomNumber": "5",
        "checkIn": "2026-02-10",
        "checkOut": "2026-02-13",
    })
}

fn messages(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e.as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Bookings
// =============================================================================

#[tokio::test]
async fn test_create_booking_returns_201() {
    let app = TestApp::new().await;

    let (status, body) = app.post("/api/bookings", somchai()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Booking created successfully");
    assert_eq!(body["data"]["roomNumber"], "5");
    assert_eq!(body["data"]["status"], "confirmed");
    assert_eq!(body["data"]["nights"], 3);
    assert_eq!(body["data"]["totalAmount"], 2400);

    let id = body["data"]["id"].as_str().unwrap().to_string();
    let (status, body) = app.get(&format!("/api/bookings/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["guestName"], "Somchai Jaidee");
}

#[tokio::test]
async fn test_overlapping_booking_returns_409() {
    let app = TestApp::new().await;
    let (_, first) = app.post("/api/bookings", somchai()).await;

    let (status, body) = app
        .post(
            "/api/bookings",
            json!({
                "guestName": "Anong Srisuk",
                "roomNumber": 5,
                "checkIn": "2026-02-12",
                "checkOut": "2026-02-14",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Room not available");
    assert_eq!(body["message"], "Room 5 is already booked for these dates");
    assert_eq!(body["conflictingBooking"]["id"], first["data"]["id"]);
}

#[tokio::test]
async fn test_turnover_day_is_bookable() {
    let app = TestApp::new().await;
    app.post("/api/bookings", somchai()).await;

    let (status, _) = app
        .post(
            "/api/bookings",
            json!({
                "guestName": "Anong Srisuk",
                "roomNumber": "5",
                "checkIn": "2026-02-13",
                "checkOut": "2026-02-15",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = app.get("/api/bookings?roomNumber=5").await;
    assert_eq!(list["count"], 2);
    // Newest check-in first
    assert_eq!(list["data"][0]["checkIn"], "2026-02-13");
}

#[tokio::test]
async fn test_invalid_booking_returns_400_with_messages() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/bookings",
            json!({
                "roomNumber": "5",
                "checkIn": "2026-01-20",
                "checkOut": "2026-01-18",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    let errors = messages(&body);
    assert!(errors.contains(&"Guest name is required".to_string()));
    assert!(errors.contains(&"Check-out date must be after check-in date".to_string()));
    assert!(errors.contains(&"Cannot create booking for past dates".to_string()));

    let (_, list) = app.get("/api/bookings").await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn test_malformed_json_returns_400() {
    let app = TestApp::new().await;

    let request = Request::post("/api/bookings")
        .header("content-type", "application/json")
        .body(Body::from("{\"guestName\": "))
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid request");
}

#[tokio::test]
async fn test_unknown_booking_returns_404() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/bookings/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not found");
    assert_eq!(body["message"], "Booking not found: nope");

    let (status, _) = app.put("/api/bookings/nope", json!({ "guestName": "X" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete("/api/bookings/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_rechecks_and_delete_frees_room() {
    let app = TestApp::new().await;
    let (_, first) = app.post("/api/bookings", somchai()).await;
    let (_, second) = app
        .post(
            "/api/bookings",
            json!({
                "guestName": "Pranee Wongsa",
                "roomNumber": "5",
                "checkIn": "2026-02-15",
                "checkOut": "2026-02-17",
            }),
        )
        .await;
    let first_id = first["data"]["id"].as_str().unwrap();
    let second_id = second["data"]["id"].as_str().unwrap();

    // Moving onto Somchai's stay
    let (status, body) = app
        .put(
            &format!("/api/bookings/{second_id}"),
            json!({ "checkIn": "2026-02-11" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Room is already booked for the requested dates");

    // Editing only the name never conflicts with itself
    let (status, body) = app
        .put(
            &format!("/api/bookings/{first_id}"),
            json!({ "guestName": "Somchai J." }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Booking updated successfully");
    assert_eq!(body["data"]["guestName"], "Somchai J.");

    let (status, body) = app.delete(&format!("/api/bookings/{first_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Booking deleted successfully");

    let (status, _) = app
        .put(
            &format!("/api/bookings/{second_id}"),
            json!({ "checkIn": "2026-02-11" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_validate_endpoint_stores_nothing() {
    let app = TestApp::new().await;

    let (status, body) = app.post("/api/bookings/validate", somchai()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "valid": true, "errors": [] }));

    let (status, body) = app
        .post("/api/bookings/validate", json!({ "guestName": " <> " }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert!(messages(&body).contains(&"Guest name is required".to_string()));

    let (_, list) = app.get("/api/bookings").await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn test_bad_list_filters_return_400() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/api/bookings?status=gone").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/api/bookings?startDate=tomorrow").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid startDate: tomorrow");
}

// =============================================================================
// Rooms & Availability
// =============================================================================

#[tokio::test]
async fn test_room_catalog_and_quote() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/rooms").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["roomTypes"].as_array().unwrap().len(), 6);

    let (status, body) = app
        .get("/api/rooms/5/quote?checkIn=2026-02-10&checkOut=2026-02-12&extraGuests=1")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["nights"], 2);
    assert_eq!(body["data"]["baseAmount"], 1600);
    assert_eq!(body["data"]["totalAmount"], 2200);

    let (status, _) = app
        .get("/api/rooms/99/quote?checkIn=2026-02-10&checkOut=2026-02-12")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/rooms/5/quote?checkIn=2026-02-10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stored_room_availability() {
    let app = TestApp::new().await;
    let (_, created) = app.post("/api/bookings", somchai()).await;
    let id = created["data"]["id"].as_str().unwrap();

    let (status, body) = app
        .get("/api/rooms/5/availability?checkIn=2026-02-11&checkOut=2026-02-12")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["conflictingBooking"]["id"], id);

    let (_, body) = app
        .get(&format!(
            "/api/rooms/5/availability?checkIn=2026-02-11&checkOut=2026-02-12&excludeBookingId={id}"
        ))
        .await;
    assert_eq!(body, json!({ "available": true }));
}

#[tokio::test]
async fn test_availability_check_over_supplied_records() {
    let app = TestApp::new().await;
    let existing = json!([
        { "id": "x", "roomNumber": "5", "status": "confirmed",
          "checkIn": "2026-02-18", "checkOut": "2026-02-20" },
        { "id": "y", "roomNumber": "5", "status": "cancelled",
          "checkIn": "2026-02-20", "checkOut": "2026-02-22" },
        { "id": "z", "roomNumber": "5", "checkIn": "garbage" },
    ]);

    let (status, body) = app
        .post(
            "/api/availability/check",
            json!({
                "roomNumber": 5,
                "checkIn": "2026-02-19",
                "checkOut": "2026-02-21",
                "existingBookings": existing,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["conflictingBooking"]["id"], "x");

    let (_, body) = app
        .post(
            "/api/availability/check",
            json!({
                "roomNumber": "5",
                "checkIn": "2026-02-19",
                "checkOut": "2026-02-21",
                "existingBookings": existing,
                "excludeBookingId": "x",
            }),
        )
        .await;
    assert_eq!(body, json!({ "available": true }));

    let (_, body) = app
        .post(
            "/api/availability/check",
            json!({
                "roomNumber": "5",
                "checkIn": "2026-02-18",
                "checkOut": "2026-02-20",
                "existingBookings": [{
                    "id": "numeric", "roomNumber": 5, "status": "confirmed",
                    "checkIn": "2026-02-18", "checkOut": "2026-02-20"
                }],
            }),
        )
        .await;
    assert_eq!(body["available"], false);
    assert_eq!(body["conflictingBooking"]["id"], "numeric");

    let (status, _) = app
        .post(
            "/api/availability/check",
            json!({ "roomNumber": "5", "checkIn": "2026-02-19" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Ledger, Report, Outbox
// =============================================================================

#[tokio::test]
async fn test_transactions_and_daily_report() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/transactions",
            json!({
                "date": "2026-02-01",
                "type": "INCOME",
                "category": "Room Revenue",
                "amount": "1500",
                "description": "Walk-in, room 2",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["amount"], 1500);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            "/api/transactions",
            json!({ "date": "2026-02-01", "type": "REFUND", "category": "Other", "amount": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(messages(&body).contains(&"Type must be either INCOME or EXPENSE".to_string()));

    app.post(
        "/api/bookings",
        json!({
            "guestName": "Wichai Thongdee",
            "roomNumber": "1",
            "checkIn": "2026-02-01",
            "checkOut": "2026-02-03",
        }),
    )
    .await;

    let (status, body) = app.get("/api/reports/daily?date=2026-02-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["income"], 1500);
    assert_eq!(body["data"]["transactionCount"], 1);
    assert_eq!(body["data"]["occupiedRooms"], 1);

    // Defaults to the resort's today
    let (_, today) = app.get("/api/reports/daily").await;
    assert_eq!(today["data"]["date"], "2026-02-01");

    let (status, body) = app
        .put(&format!("/api/transactions/{id}"), json!({ "amount": 1800 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["amount"], 1800);

    let (_, list) = app.get("/api/transactions?type=INCOME").await;
    assert_eq!(list["count"], 1);

    let (status, body) = app.delete(&format!("/api/transactions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Transaction deleted successfully");

    let (status, _) = app.get(&format!("/api/transactions/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_outbox_lists_and_acknowledges() {
    let app = TestApp::new().await;
    app.post("/api/bookings", somchai()).await;

    let (status, body) = app.get("/api/outbox").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["eventType"], "booking.created");
    let entry = body["data"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            &format!("/api/outbox/{entry}/failed"),
            json!({ "error": "LINE API timeout" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/api/outbox").await;
    assert_eq!(body["data"][0]["attempts"], 1);
    assert_eq!(body["data"][0]["lastError"], "LINE API timeout");

    let (status, _) = app
        .post(&format!("/api/outbox/{entry}/delivered"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/api/outbox").await;
    assert_eq!(body["count"], 0);

    let (status, _) = app.post("/api/outbox/missing/delivered", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Middleware
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
    assert_eq!(body["today"], "2026-02-01");
    assert_eq!(body["migrations"]["applied"], body["migrations"]["embedded"]);
}

#[tokio::test]
async fn test_api_key_guards_writes_only() {
    let app = TestApp::with(Some("desk-secret"), 1000).await;

    let (status, body) = app.post("/api/bookings", somchai()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "Unauthorized",
            "message": "Invalid or missing API key",
        })
    );

    let wrong = Request::post("/api/bookings")
        .header("content-type", "application/json")
        .header("x-api-key", "guess")
        .body(Body::from(somchai().to_string()))
        .unwrap();
    assert_eq!(app.send(wrong).await.0, StatusCode::UNAUTHORIZED);

    // Reads stay open
    let (status, _) = app.get("/api/bookings").await;
    assert_eq!(status, StatusCode::OK);

    let with_header = Request::post("/api/bookings")
        .header("content-type", "application/json")
        .header("x-api-key", "desk-secret")
        .body(Body::from(somchai().to_string()))
        .unwrap();
    assert_eq!(app.send(with_header).await.0, StatusCode::CREATED);

    let with_bearer = Request::post("/api/bookings/validate")
        .header("content-type", "application/json")
        .header("authorization", "Bearer desk-secret")
        .body(Body::from(somchai().to_string()))
        .unwrap();
    assert_eq!(app.send(with_bearer).await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_per_client() {
    let app = TestApp::with(None, 2).await;

    let from = |ip: &str| {
        Request::get("/health")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    };

    assert_eq!(app.send(from("203.0.113.7")).await.0, StatusCode::OK);
    assert_eq!(app.send(from("203.0.113.7, 10.0.0.1")).await.0, StatusCode::OK);

    let (status, body) = app.send(from("203.0.113.7")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many requests");
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Rate limit exceeded. Try again in "));
    assert!(message.ends_with('s'));

    // Another client is unaffected
    assert_eq!(app.send(from("198.51.100.2")).await.0, StatusCode::OK);
}
