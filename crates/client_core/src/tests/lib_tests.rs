use super::*;

use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::{PerPage, SortOrder};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    filters::{EventFilters, FilterChange},
    list_controller::AttendeeQuery,
    test_support::event,
};

#[derive(Clone, Default)]
struct ServerState {
    event_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    registrations: Arc<Mutex<Vec<(i64, Value)>>>,
}

fn pagination(total: u64) -> Value {
    json!({
        "current_page": 1,
        "per_page": 10,
        "total": total,
        "last_page": 1,
        "from": if total == 0 { Value::Null } else { json!(1) },
        "to": if total == 0 { Value::Null } else { json!(total) },
    })
}

async fn list_events(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.event_queries.lock().await.push(query);
    Json(json!({
        "success": true,
        "message": "Events retrieved successfully",
        "data": {
            "data": [event(1, "Rust Meetup", 50, 10)],
            "pagination": pagination(1),
            "filters_applied": {"sort_by": "start_time", "sort_order": "desc"}
        }
    }))
}

async fn list_locations() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Locations retrieved successfully",
        "data": ["Berlin", "Pune"]
    }))
}

async fn register(
    State(state): State<ServerState>,
    Path(event_id): Path<i64>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut registrations = state.registrations.lock().await;
    let duplicate = registrations
        .iter()
        .any(|(id, existing)| *id == event_id && existing["email"] == body["email"]);
    if duplicate {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "message": "The given data was invalid.",
                "errors": {"email": ["This email is already registered for this event."]}
            })),
        );
    }
    registrations.push((event_id, body.clone()));
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Attendee registered successfully",
            "data": {
                "id": registrations.len(),
                "event_id": event_id,
                "name": body["name"],
                "email": body["email"],
                "created_at": "2024-03-10T10:00:00+05:30",
                "updated_at": "2024-03-10T10:00:00+05:30"
            }
        })),
    )
}

async fn create_event_rejected() -> Json<Value> {
    Json(json!({
        "success": false,
        "message": "Event overlaps an existing booking",
        "data": null
    }))
}

async fn attendees_without_data() -> Json<Value> {
    Json(json!({"success": true, "message": "ok"}))
}

async fn slow_locations() -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(500)).await;
    list_locations().await
}

async fn spawn_event_server() -> Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/events", get(list_events).post(create_event_rejected))
        .route("/api/events/locations", get(list_locations))
        .route("/api/events/:id/register", post(register))
        .route("/api/events/2/attendees", get(attendees_without_data))
        .route("/slow/events/locations", get(slow_locations))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

#[tokio::test]
async fn list_events_sends_filters_as_query_string() {
    let (server_url, state) = spawn_event_server().await.expect("spawn server");
    let api = HttpEventApi::new(&format!("{server_url}/api/")).expect("client");
    assert_eq!(api.base_url(), format!("{server_url}/api"));

    let filters = EventFilters::default()
        .apply([
            FilterChange::SearchFor(Some("rust".to_string())),
            FilterChange::SortOrder(SortOrder::Desc),
            FilterChange::ToggleLocation {
                location: "Pune".to_string(),
                selected: true,
            },
            FilterChange::ToggleLocation {
                location: "Berlin".to_string(),
                selected: true,
            },
            FilterChange::SeatAvailable(true),
            FilterChange::PerPage(PerPage::Twenty),
        ])
        .go_to_page(2);

    let page = api.list_events(&filters).await.expect("events");
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].name, "Rust Meetup");
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.filters_applied.sort_order.as_deref(), Some("desc"));

    let queries = state.event_queries.lock().await;
    let sent = &queries[0];
    assert_eq!(sent.get("page").map(String::as_str), Some("2"));
    assert_eq!(sent.get("per_page").map(String::as_str), Some("20"));
    assert_eq!(sent.get("sort_by").map(String::as_str), Some("start_time"));
    assert_eq!(sent.get("sort_order").map(String::as_str), Some("desc"));
    assert_eq!(sent.get("search_for").map(String::as_str), Some("rust"));
    assert_eq!(sent.get("search_in").map(String::as_str), Some("all"));
    assert_eq!(
        sent.get("filter_by_location").map(String::as_str),
        Some("Berlin,Pune")
    );
    assert_eq!(
        sent.get("seat_available_events").map(String::as_str),
        Some("true")
    );
    assert_eq!(sent.get("timezone").map(String::as_str), Some("Asia/Kolkata"));
}

#[tokio::test]
async fn default_filters_omit_empty_search_and_locations() {
    let (server_url, state) = spawn_event_server().await.expect("spawn server");
    let api = HttpEventApi::new(&format!("{server_url}/api")).expect("client");

    api.list_events(&EventFilters::default()).await.expect("events");

    let queries = state.event_queries.lock().await;
    assert!(!queries[0].contains_key("search_for"));
    assert!(!queries[0].contains_key("filter_by_location"));
    assert_eq!(queries[0].get("page").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn locations_are_unwrapped_from_the_envelope() {
    let (server_url, _state) = spawn_event_server().await.expect("spawn server");
    let api = HttpEventApi::new(&format!("{server_url}/api")).expect("client");

    let locations = api.list_locations().await.expect("locations");
    assert_eq!(locations, vec!["Berlin".to_string(), "Pune".to_string()]);
}

#[tokio::test]
async fn duplicate_registration_surfaces_field_error() {
    let (server_url, state) = spawn_event_server().await.expect("spawn server");
    let api = HttpEventApi::new(&format!("{server_url}/api")).expect("client");
    let request = RegisterAttendeeRequest {
        name: "Ada".to_string(),
        email: "a@b.com".to_string(),
    };

    let attendee = api
        .register_attendee(EventId(5), &request)
        .await
        .expect("first registration");
    assert_eq!(attendee.event_id, EventId(5));
    assert_eq!(attendee.email, "a@b.com");

    let err = api
        .register_attendee(EventId(5), &request)
        .await
        .expect_err("duplicate");
    match &err {
        ClientError::Rejected { status, body } => {
            assert_eq!(*status, 422);
            assert_eq!(body.summary(), Some("The given data was invalid."));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.user_message("Failed to register attendee"),
        "This email is already registered for this event."
    );
    assert_eq!(state.registrations.lock().await.len(), 1);
}

#[tokio::test]
async fn failure_envelope_is_rejected_with_server_message() {
    let (server_url, _state) = spawn_event_server().await.expect("spawn server");
    let api = HttpEventApi::new(&format!("{server_url}/api")).expect("client");
    let request = CreateEventRequest {
        name: "Launch".to_string(),
        location: "Pune".to_string(),
        start_time: "2024-03-15 10:00:00".to_string(),
        end_time: "2024-03-15 12:00:00".to_string(),
        max_capacity: 10,
        timezone: Some("Asia/Kolkata".to_string()),
    };

    let err = api.create_event(&request).await.expect_err("rejected");
    assert!(matches!(err, ClientError::Rejected { status: 200, .. }));
    assert_eq!(
        err.user_message("Failed to create event"),
        "Event overlaps an existing booking"
    );
}

#[tokio::test]
async fn success_without_data_is_a_decode_error() {
    let (server_url, _state) = spawn_event_server().await.expect("spawn server");
    let api = HttpEventApi::new(&format!("{server_url}/api")).expect("client");

    let err = api
        .list_attendees(&AttendeeQuery::new(EventId(2)))
        .await
        .expect_err("no data");
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn unknown_route_maps_to_not_found() {
    let (server_url, _state) = spawn_event_server().await.expect("spawn server");
    let api = HttpEventApi::new(&format!("{server_url}/api")).expect("client");

    let err = api
        .list_attendees(&AttendeeQuery::new(EventId(77)))
        .await
        .expect_err("missing");
    assert!(matches!(err, ClientError::NotFound));
    assert_eq!(err.code(), shared::error::ErrorCode::NotFound);
}

#[tokio::test]
async fn slow_server_times_out() {
    let (server_url, _state) = spawn_event_server().await.expect("spawn server");
    let api = HttpEventApi::with_timeout(&format!("{server_url}/slow"), Duration::from_millis(100))
        .expect("client");

    let err = api.list_locations().await.expect_err("timeout");
    assert!(matches!(err, ClientError::Timeout), "got {err:?}");
    assert_eq!(
        err.user_message("Failed to fetch locations"),
        "Failed to fetch locations"
    );
}

#[test]
fn base_url_must_be_http() {
    assert!(matches!(
        HttpEventApi::new("ftp://example.com/api"),
        Err(ClientError::Transport(_))
    ));
    assert!(matches!(
        HttpEventApi::new("not a url"),
        Err(ClientError::Transport(_))
    ));
    let api = HttpEventApi::new(DEFAULT_API_BASE_URL).expect("default url");
    assert_eq!(api.base_url(), "http://localhost:8000/api");
}
