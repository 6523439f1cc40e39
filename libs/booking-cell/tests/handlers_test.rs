use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use booking_cell::router::booking_routes;
use shared_database::{Collection, DocumentStore, Filter};
use shared_utils::test_utils::TestState;

fn app(state: &TestState) -> Router {
    booking_routes(state.app_state())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::empty()).unwrap()
}

fn b1() -> Value {
    json!({
        "treatmentName": "Cleaning",
        "slotDate": "2024-01-05",
        "patientName": "Alice",
        "patientEmail": "a@x.com",
        "slotTime": "10:00"
    })
}

async fn create(state: &TestState, booking: Value) -> Value {
    let (status, body) = send(app(state), json_request("POST", "/booking", booking)).await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn test_create_booking() {
    let state = TestState::new();
    let body = create(&state, b1()).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["result"]["acknowledged"], true);
    assert!(body["result"]["insertedId"].is_string());
}

#[tokio::test]
async fn test_duplicate_booking_is_soft_failure() {
    let state = TestState::new();
    let first = create(&state, b1()).await;

    let mut again = b1();
    again["slotTime"] = json!("11:30");
    let body = create(&state, again).await;

    assert_eq!(body["success"], false);
    assert_eq!(body["booking"]["_id"], first["result"]["insertedId"]);
    assert_eq!(body["booking"]["slotTime"], "10:00");
    assert_eq!(body["booking"]["patientEmail"], "a@x.com");
    assert_eq!(state.store.len(Collection::Bookings).await, 1);
}

#[tokio::test]
async fn test_create_booking_requires_fields() {
    let state = TestState::new();
    let mut incomplete = b1();
    incomplete.as_object_mut().unwrap().remove("slotDate");

    let (status, body) = send(app(&state), json_request("POST", "/booking", incomplete)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "slotDate is required");
}

#[tokio::test]
async fn test_list_own_bookings() {
    let state = TestState::new();
    create(&state, b1()).await;
    let mut other = b1();
    other["patientName"] = json!("Bob");
    other["patientEmail"] = json!("b@x.com");
    create(&state, other).await;

    let auth = state.bearer_for("a@x.com");
    let (status, body) = send(app(&state), get("/booking?patientEmail=a@x.com", Some(&auth))).await;

    assert_eq!(status, StatusCode::OK);
    let bookings = body.as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["patientName"], "Alice");
}

#[tokio::test]
async fn test_list_other_patients_bookings_is_forbidden() {
    let state = TestState::new();
    let mut other = b1();
    other["patientEmail"] = json!("other@x.com");
    create(&state, other).await;

    let auth = state.bearer_for("user@x.com");
    let (status, body) = send(
        app(&state),
        get("/booking?patientEmail=other@x.com", Some(&auth)),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "message": "Forbidden Access" }));
}

#[tokio::test]
async fn test_list_bookings_without_email_is_forbidden() {
    let state = TestState::new();
    let auth = state.bearer_for("user@x.com");
    let (status, _) = send(app(&state), get("/booking", Some(&auth))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_bookings_requires_token() {
    let state = TestState::new();
    let (status, body) = send(app(&state), get("/booking?patientEmail=a@x.com", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized Access");
}

#[tokio::test]
async fn test_get_booking_by_id() {
    let state = TestState::new();
    let created = create(&state, b1()).await;
    let id = created["result"]["insertedId"].as_str().unwrap();
    let auth = state.bearer_for("a@x.com");

    let (status, body) = send(app(&state), get(&format!("/booking/{}", id), Some(&auth))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["treatmentName"], "Cleaning");

    let (status, body) = send(app(&state), get("/booking/does-not-exist", Some(&auth))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_payment_round_trip() {
    let state = TestState::new();
    let created = create(&state, b1()).await;
    let id = created["result"]["insertedId"].as_str().unwrap().to_string();

    let (status, body) = send(
        app(&state),
        json_request("PATCH", &format!("/booking/{}", id), json!({ "transactionId": "tx123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "paid": true, "transactionId": "tx123" }));

    let auth = state.bearer_for("a@x.com");
    let (_, booking) = send(app(&state), get(&format!("/booking/{}", id), Some(&auth))).await;
    assert_eq!(booking["paid"], true);
    assert_eq!(booking["transactionId"], "tx123");
    assert_eq!(state.store.len(Collection::Payments).await, 1);
}

#[tokio::test]
async fn test_payment_requires_transaction_id() {
    let state = TestState::new();
    let created = create(&state, b1()).await;
    let id = created["result"]["insertedId"].as_str().unwrap().to_string();

    let (status, _) = send(
        app(&state),
        json_request("PATCH", &format!("/booking/{}", id), json!({ "price": 90 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(state.store.len(Collection::Payments).await, 0);
}

#[tokio::test]
async fn test_second_payment_does_not_replace_first() {
    let state = TestState::new();
    let created = create(&state, b1()).await;
    let id = created["result"]["insertedId"].as_str().unwrap().to_string();
    let uri = format!("/booking/{}", id);

    let (status, _) = send(app(&state), json_request("PATCH", &uri, json!({ "transactionId": "tx1" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app(&state), json_request("PATCH", &uri, json!({ "transactionId": "tx2" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "paid": true, "transactionId": "tx1" }));

    let payments = state
        .store
        .find(Collection::Payments, &Filter::new().eq("bookingId", id.as_str()))
        .await
        .unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["transactionId"], "tx1");

    let auth = state.bearer_for("a@x.com");
    let (_, booking) = send(app(&state), get(&uri, Some(&auth))).await;
    assert_eq!(booking["transactionId"], "tx1");
}

#[tokio::test]
async fn test_mistyped_field_is_bad_request() {
    let state = TestState::new();
    let mut body = b1();
    body["slotTime"] = json!(10);

    let (status, body) = send(app(&state), json_request("POST", "/booking", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("slotTime"));
    assert_eq!(state.store.len(Collection::Bookings).await, 0);
}
