#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// What the fake entries/statistics API serves.
#[derive(Debug, Default)]
pub struct MockData {
    pub entries: Vec<Value>,
    /// Serve `GET /api/entries` as a bare array instead of `{entries}`.
    pub bare_array: bool,
    /// `None` answers `GET /api/stats` with 404.
    pub stats: Option<Value>,
    pub fail_put: bool,
    pub seen_windows: Vec<String>,
    pub posts: usize,
    pub puts: usize,
}

pub type SharedMock = Arc<Mutex<MockData>>;

/// Serves the fake API on an ephemeral port until the runtime shuts down.
pub async fn spawn_mock_api(data: MockData) -> (String, SharedMock) {
    let shared = Arc::new(Mutex::new(data));
    let app = Router::new()
        .route(
            "/api/entries",
            get(list_entries).post(create_entry).put(update_entry),
        )
        .route("/api/stats", get(stats))
        .with_state(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock api");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), shared)
}

pub fn entry(date: &str, weight: f64, sleep_hours: f64) -> Value {
    json!({
        "id": 1,
        "date": date,
        "weight": weight,
        "body_fat": null,
        "calories": 2100,
        "training_volume": null,
        "steps": 8000,
        "sleep_total": "07:30",
        "sleep_total_decimal": sleep_hours,
        "sleep_quality": null,
        "observations": null,
    })
}

async fn list_entries(
    State(mock): State<SharedMock>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut data = mock.lock().unwrap();

    if let Some(date) = query.get("date") {
        return match data.entries.iter().find(|e| e["date"] == date.as_str()) {
            Some(entry) => Json(json!({ "success": true, "entry": entry })).into_response(),
            None => (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "error": "Entry not found for the given date" })),
            )
                .into_response(),
        };
    }

    if let Some(window) = query.get("window") {
        data.seen_windows.push(window.clone());
    }
    let entries = data.entries.clone();
    if data.bare_array {
        Json(Value::Array(entries)).into_response()
    } else {
        Json(json!({ "success": true, "entries": entries })).into_response()
    }
}

async fn stats(State(mock): State<SharedMock>) -> Response {
    let data = mock.lock().unwrap();
    match &data.stats {
        Some(stats) => Json(stats.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "error": "No data available" })),
        )
            .into_response(),
    }
}

async fn create_entry(State(mock): State<SharedMock>, Json(body): Json<Value>) -> Response {
    let mut data = mock.lock().unwrap();
    data.posts += 1;
    if data.entries.iter().any(|e| e["date"] == body["date"]) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "success": false, "error": "Date already exists" })),
        )
            .into_response();
    }
    data.entries.push(body.clone());
    (StatusCode::CREATED, Json(json!({ "success": true, "entry": body }))).into_response()
}

async fn update_entry(State(mock): State<SharedMock>, Json(body): Json<Value>) -> Response {
    let mut data = mock.lock().unwrap();
    data.puts += 1;
    if data.fail_put {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database is locked").into_response();
    }
    match data.entries.iter_mut().find(|e| e["date"] == body["date"]) {
        Some(existing) => {
            *existing = body.clone();
            Json(json!({ "success": true, "entry": body })).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "error": "Entry not found for the given date" })),
        )
            .into_response(),
    }
}
