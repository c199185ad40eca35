#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use studyplan_backend::config::Config;

pub fn create_test_app() -> Router {
    studyplan_backend::create_app_with_config(Config::default())
}

pub fn create_test_app_with(config: Config) -> Router {
    studyplan_backend::create_app_with_config(config)
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body.to_string())).await
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

/// Two topics, weekday evenings plus Saturday, starting Monday 2024-01-01
pub fn sample_schedule_request() -> Value {
    let evening = json!([{ "start": "16:00", "end": "20:00" }]);
    json!({
        "topics": [
            { "id": "maths-1", "subject": "Mathematics", "name": "Quadratic equations" },
            { "id": "hist-1", "subject": "History", "name": "Cold War", "difficulty": 2 }
        ],
        "availability": {
            "monday": evening,
            "tuesday": evening,
            "wednesday": evening,
            "thursday": evening,
            "friday": evening,
            "saturday": [{ "start": "9:00", "end": "13:00" }, { "start": "14:00", "end": "18:00" }]
        },
        "preferences": {
            "maxSessionsPerDay": 3,
            "breakLengthMinutes": 10,
            "studyStyle": "balanced",
            "scheduleStartDate": "2024-01-01"
        }
    })
}
