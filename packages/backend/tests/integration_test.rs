use axum::http::StatusCode;
use serde_json::{json, Value};

use studyplan_backend::config::Config;

mod common;

#[tokio::test]
async fn test_health_root() {
    let (status, body) = common::get(common::create_test_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_health_live() {
    let (status, body) = common::get(common::create_test_app(), "/health/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_info() {
    let (status, body) = common::get(common::create_test_app(), "/api/health/info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "studyplan-backend");
    assert!(body["startTime"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, body) = common::get(common::create_test_app(), "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_generate_timetable() {
    let (status, body) = common::post_json(
        common::create_test_app(),
        "/api/timetable/generate",
        &common::sample_schedule_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert!(uuid::Uuid::parse_str(data["id"].as_str().unwrap()).is_ok());
    assert_eq!(data["fingerprint"].as_str().unwrap().len(), 64);

    let schedule = &data["schedule"];
    let sessions = schedule["sessions"].as_array().unwrap();
    let unresolved = schedule["unresolved"].as_array().unwrap();
    assert_eq!(schedule["summary"]["requestedSessions"], 10);
    assert_eq!(sessions.len() + unresolved.len(), 10);

    let first = &sessions[0];
    assert_eq!(first["startTime"], "2024-01-01T16:00:00+00:00");
    assert!(first["cognitiveLoad"].is_number());
    assert_eq!(sessions.last().unwrap()["hasBreakAfter"], false);
}

#[tokio::test]
async fn test_generate_is_deterministic() {
    let request = common::sample_schedule_request();
    let (_, first) =
        common::post_json(common::create_test_app(), "/api/timetable/generate", &request).await;
    let (_, second) =
        common::post_json(common::create_test_app(), "/api/timetable/generate", &request).await;

    assert_eq!(first["data"]["fingerprint"], second["data"]["fingerprint"]);
    assert_eq!(first["data"]["schedule"], second["data"]["schedule"]);
    assert_ne!(first["data"]["id"], second["data"]["id"]);
}

#[tokio::test]
async fn test_generate_rejects_empty_topics() {
    let mut request = common::sample_schedule_request();
    request["topics"] = json!([]);
    let (status, body) =
        common::post_json(common::create_test_app(), "/api/timetable/generate", &request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_generate_rejects_inverted_window() {
    let mut request = common::sample_schedule_request();
    request["availability"]["sunday"] = json!([{ "start": "18:00", "end": "17:00" }]);
    let (status, body) =
        common::post_json(common::create_test_app(), "/api/timetable/generate", &request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("sunday"));
}

#[tokio::test]
async fn test_generate_rejects_malformed_json() {
    let (status, body) = common::send(
        common::create_test_app(),
        axum::http::Method::POST,
        "/api/timetable/generate",
        Some("{\"topics\": [".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["error"].as_str().unwrap().starts_with("malformed JSON body"));
}

#[tokio::test]
async fn test_generate_rejects_bad_clock_string() {
    let mut request = common::sample_schedule_request();
    request["availability"]["monday"] = json!([{ "start": "25:00", "end": "26:00" }]);
    let (status, body) =
        common::post_json(common::create_test_app(), "/api/timetable/generate", &request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_generate_without_start_date() {
    let mut request = common::sample_schedule_request();
    request["preferences"]
        .as_object_mut()
        .unwrap()
        .remove("scheduleStartDate");
    let (status, body) =
        common::post_json(common::create_test_app(), "/api/timetable/generate", &request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["schedule"]["summary"]["requestedSessions"], 10);
}

#[tokio::test]
async fn test_block_policy_from_config() {
    let mut request = common::sample_schedule_request();
    request["availability"]["monday"] = json!([{ "start": "14:00", "end": "20:00" }]);

    let (_, annotated) =
        common::post_json(common::create_test_app(), "/api/timetable/generate", &request).await;
    let first = &annotated["data"]["schedule"]["sessions"][0];
    assert_eq!(first["startTime"], "2024-01-01T14:00:00+00:00");

    let app = common::create_test_app_with(Config {
        school_hours_policy: studyplan_algo::SchoolHoursPolicy::Block,
        ..Config::default()
    });
    let (_, blocked) = common::post_json(app, "/api/timetable/generate", &request).await;
    let first = &blocked["data"]["schedule"]["sessions"][0];
    assert_eq!(first["startTime"], "2024-01-01T15:30:00+00:00");
}

#[tokio::test]
async fn test_analyze_topics() {
    let request = json!({
        "topics": [
            { "id": "phys-1", "subject": "Science (Physics)", "name": "Quantum basics" },
            { "id": "art-1", "subject": "Art & Design", "name": "Still life" }
        ]
    });
    let (status, body) =
        common::post_json(common::create_test_app(), "/api/timetable/analyze", &request).await;
    assert_eq!(status, StatusCode::OK);

    let analyses = body["data"]["analyses"].as_array().unwrap();
    assert_eq!(analyses[0]["estimatedDifficulty"], 5);
    assert_eq!(analyses[0]["optimalSessionType"], "distributed");
    assert_eq!(analyses[1]["estimatedDifficulty"], 2);

    let cycles = body["data"]["plan"]["revisionCycles"].as_array().unwrap();
    assert_eq!(cycles.len(), 2);
    assert_eq!(cycles[0]["cycles"][0]["sessionType"], "new-learning");
    assert_eq!(cycles[0]["cycles"][4]["sessionType"], "practice-test");
}

async fn generated_sessions() -> (Value, Value) {
    let request = common::sample_schedule_request();
    let (_, body) =
        common::post_json(common::create_test_app(), "/api/timetable/generate", &request).await;
    (body["data"]["schedule"]["sessions"].clone(), request)
}

#[tokio::test]
async fn test_adjust_cancel_and_reject() {
    let (sessions, request) = generated_sessions().await;
    let before = sessions.as_array().unwrap().len();
    let target = sessions[0]["id"].clone();

    let adjust = json!({
        "sessions": sessions,
        "availability": request["availability"],
        "preferences": request["preferences"],
        "edits": [
            { "sessionId": target, "action": { "type": "cancel" }, "reason": "school trip" },
            { "sessionId": sessions[1]["id"], "action": { "type": "reschedule", "start": "06:00" } }
        ]
    });
    let (status, body) =
        common::post_json(common::create_test_app(), "/api/timetable/adjust", &adjust).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["sessions"].as_array().unwrap().len(), before - 1);
    assert_eq!(data["rejected"].as_array().unwrap().len(), 1);
    assert_eq!(data["rejected"][0]["action"]["type"], "reschedule");
    assert_eq!(data["summary"]["totalSessions"], before - 1);
}

#[tokio::test]
async fn test_adjust_unknown_session() {
    let (sessions, request) = generated_sessions().await;
    let adjust = json!({
        "sessions": sessions,
        "availability": request["availability"],
        "edits": [{ "sessionId": "ghost-9", "action": { "type": "cancel" } }]
    });
    let (status, body) =
        common::post_json(common::create_test_app(), "/api/timetable/adjust", &adjust).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_adjust_route_can_be_disabled() {
    let app = common::create_test_app_with(Config {
        enable_adjust: false,
        ..Config::default()
    });
    let (status, body) = common::post_json(app, "/api/timetable/adjust", &json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_adjust_rejects_oversized_extend() {
    let (sessions, request) = generated_sessions().await;
    let adjust = json!({
        "sessions": sessions,
        "availability": request["availability"],
        "preferences": request["preferences"],
        "edits": [{ "sessionId": sessions[0]["id"], "action": { "type": "extend", "minutes": 4294967286u64 } }]
    });
    let (status, body) =
        common::post_json(common::create_test_app(), "/api/timetable/adjust", &adjust).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
