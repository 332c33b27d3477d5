use super::*;
use crate::{ActionOutcome, BookingBoard, BookingForm};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::TimeSlot;
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone, PartialEq)]
enum Received {
    Create(Value),
    Update(i64, Value),
    Delete(i64),
}

#[derive(Clone)]
struct MockState {
    listing: Value,
    create_status: StatusCode,
    received: Arc<Mutex<Vec<Received>>>,
}

async fn list_handler(State(state): State<MockState>) -> Json<Value> {
    Json(state.listing.clone())
}

async fn create_handler(
    State(state): State<MockState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.received.lock().await.push(Received::Create(body.clone()));
    if !state.create_status.is_success() {
        return (state.create_status, Json(json!({ "code": "internal", "message": "boom" })));
    }
    let mut created = body;
    created["id"] = json!(77);
    (StatusCode::CREATED, Json(created))
}

async fn update_handler(
    State(state): State<MockState>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> StatusCode {
    state.received.lock().await.push(Received::Update(id, body));
    StatusCode::OK
}

async fn delete_handler(State(state): State<MockState>, Path(id): Path<i64>) -> StatusCode {
    state.received.lock().await.push(Received::Delete(id));
    if id == 404 {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn spawn_bookings_server(
    listing: Value,
    create_status: StatusCode,
) -> (String, Arc<Mutex<Vec<Received>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        listing,
        create_status,
        received: Arc::clone(&received),
    };
    let app = Router::new()
        .route("/api/bookings", get(list_handler).post(create_handler))
        .route("/api/bookings/:id", put(update_handler).delete(delete_handler))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/api"), received)
}

fn local_store(server_url: &str) -> HttpBookingStore {
    let http = Client::builder().no_proxy().build().expect("client");
    HttpBookingStore::with_client(http, server_url).expect("store")
}

fn slot(label: &str) -> TimeSlot {
    TimeSlot::from_label(label).expect("known slot")
}

#[test]
fn joins_bookings_onto_base_path() {
    let store = HttpBookingStore::new("http://example.test/api").expect("store");
    assert_eq!(store.bookings_url().as_str(), "http://example.test/api/bookings");
    assert_eq!(
        store.booking_url(&BookingId::from(12)).as_str(),
        "http://example.test/api/bookings/12"
    );
    assert_eq!(
        store.booking_url(&BookingId::from("doc 7/a")).as_str(),
        "http://example.test/api/bookings/doc%207%2Fa"
    );

    let root = HttpBookingStore::new("http://example.test").expect("store");
    assert_eq!(root.bookings_url().as_str(), "http://example.test/bookings");
}

#[test]
fn rejects_unparseable_base_url() {
    let err = HttpBookingStore::new("not a url").expect_err("invalid");
    assert!(matches!(err, StoreError::InvalidUrl { .. }));
}

#[tokio::test]
async fn board_round_trips_against_http_store() {
    let listing = json!([
        { "id": 1, "time": "7:00 PM", "name": "Ada", "room_number": 214, "number_of_people": 2 },
        { "id": 2, "time": "11:00 PM", "name": "Night owl", "room_number": "9", "number_of_people": 1 }
    ]);
    let (server_url, received) = spawn_bookings_server(listing, StatusCode::CREATED).await;
    let mut board = BookingBoard::new(local_store(&server_url));

    board.load().await;
    assert_eq!(board.total_bookings(), 1);
    assert_eq!(board.bookings(slot("7:00 PM"))[0].room_number, "214");

    let added = board
        .add(slot("7:00 PM"), &BookingForm::new("Grace", "301", "4"))
        .await;
    assert_eq!(added, ActionOutcome::Applied);
    assert_eq!(board.bookings(slot("7:00 PM"))[1].id, BookingId::from(77));

    let edited = board
        .edit(slot("7:00 PM"), 0, &BookingForm::new("Ada L.", "215", "3"))
        .await;
    assert_eq!(edited, ActionOutcome::Applied);

    let deleted = board.delete(slot("7:00 PM"), 1).await;
    assert_eq!(deleted, ActionOutcome::Applied);
    assert_eq!(board.bookings(slot("7:00 PM")).len(), 1);
    assert_eq!(board.bookings(slot("7:00 PM"))[0].name, "Ada L.");

    let received = received.lock().await.clone();
    assert_eq!(
        received,
        vec![
            Received::Create(json!({
                "time": "7:00 PM", "name": "Grace", "roomNumber": "301", "numberOfPeople": 4
            })),
            Received::Update(1, json!({ "name": "Ada L.", "roomNumber": "215", "numberOfPeople": 3 })),
            Received::Delete(77),
        ]
    );
}

#[tokio::test]
async fn odd_listing_rows_are_dropped_individually() {
    let listing = json!([
        { "id": 1, "time": "7:00 PM", "name": "Ada", "room_number": "1", "number_of_people": 2 },
        { "id": 2, "time": null, "name": "No time", "room_number": "2", "number_of_people": 2 },
        { "id": 3, "time": 1900, "name": "Numeric time", "room_number": "3", "number_of_people": 2 },
        { "id": 4, "name": "Missing time", "room_number": "4", "number_of_people": 2 },
        { "id": 5, "time": "7:00 PM", "name": "Bad size", "room_number": "5", "number_of_people": "lots" },
        { "id": "65a1f0c2", "time": "8:00 PM", "name": "Grace", "room_number": 12, "number_of_people": 3 }
    ]);
    let (server_url, _received) = spawn_bookings_server(listing, StatusCode::CREATED).await;
    let mut board = BookingBoard::new(local_store(&server_url));

    board.load().await;

    assert_eq!(board.total_bookings(), 2);
    assert_eq!(board.bookings(slot("7:00 PM"))[0].name, "Ada");
    let grace = &board.bookings(slot("8:00 PM"))[0];
    assert_eq!(grace.id, BookingId::from("65a1f0c2"));
    assert_eq!(grace.room_number, "12");
}

#[tokio::test]
async fn non_ok_create_is_a_status_error() {
    let (server_url, received) =
        spawn_bookings_server(json!([]), StatusCode::INTERNAL_SERVER_ERROR).await;
    let store = local_store(&server_url);

    let err = store
        .create(&CreateBookingRequest {
            time: "5:00 PM".into(),
            name: "Ada".into(),
            room_number: "1".into(),
            number_of_people: 1,
        })
        .await
        .expect_err("must fail");

    match err {
        StoreError::Status { status, body } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert!(body.contains("boom"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(received.lock().await.len(), 1);
}

#[tokio::test]
async fn failed_http_create_leaves_board_unchanged() {
    let listing = json!([
        { "id": 1, "time": "6:00 PM", "name": "Ada", "room_number": "1", "number_of_people": 2 }
    ]);
    let (server_url, _received) =
        spawn_bookings_server(listing, StatusCode::SERVICE_UNAVAILABLE).await;
    let mut board = BookingBoard::new(local_store(&server_url));
    board.load().await;
    let before = board.bookings_by_slot().clone();

    let outcome = board
        .add(slot("6:00 PM"), &BookingForm::new("Grace", "2", "2"))
        .await;

    assert_eq!(outcome, ActionOutcome::Failed);
    assert_eq!(board.bookings_by_slot(), &before);
}

#[tokio::test]
async fn delete_of_missing_booking_reports_status() {
    let (server_url, _received) = spawn_bookings_server(json!([]), StatusCode::CREATED).await;
    let err = local_store(&server_url)
        .delete(&BookingId::from(404))
        .await
        .expect_err("must fail");
    assert!(matches!(err, StoreError::Status { status, .. } if status == StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn malformed_listing_is_a_decode_error() {
    let (server_url, _received) =
        spawn_bookings_server(json!({ "not": "a list" }), StatusCode::CREATED).await;
    let err = local_store(&server_url).list().await.expect_err("must fail");
    assert!(matches!(err, StoreError::Decode(_)));
}

#[tokio::test]
async fn unreachable_store_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = local_store(&format!("http://{addr}"))
        .list()
        .await
        .expect_err("must fail");
    assert!(matches!(err, StoreError::Network(_)));
}
