//! End-to-end scheduling scenarios

use chrono::NaiveDate;

use studyplan_algo::{
    generate_schedule, ConflictReason, PipelineOptions, Preferences, ScheduleRequest, SessionKind,
    TimeWindow, Topic, WeeklyAvailability,
};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn monday_only(start: &str, end: &str) -> WeeklyAvailability {
    let mut availability = WeeklyAvailability::default();
    availability.monday.push(TimeWindow::parse(start, end).unwrap());
    availability
}

fn request(topics: Vec<Topic>, availability: WeeklyAvailability, max_sessions: usize) -> ScheduleRequest {
    ScheduleRequest {
        topics,
        availability,
        preferences: Preferences {
            max_sessions_per_day: max_sessions,
            break_length_minutes: 10,
            schedule_start_date: Some(date(1)),
            ..Preferences::default()
        },
        existing_sessions: Vec::new(),
    }
}

fn maths() -> Topic {
    Topic::new("maths", "Mathematics", "Quadratic equations").with_difficulty(5)
}

#[test]
fn test_hard_maths_topic_with_monday_evenings() {
    let req = request(vec![maths()], monday_only("16:00", "20:00"), 4);
    let schedule = generate_schedule(&req, &PipelineOptions::default()).unwrap();

    let placed: Vec<(&str, NaiveDate)> = schedule
        .sessions
        .iter()
        .map(|s| (s.id(), s.date()))
        .collect();
    assert_eq!(
        placed,
        vec![("maths-0", date(1)), ("maths-3", date(8)), ("maths-4", date(15))]
    );

    let first = &schedule.sessions[0];
    assert_eq!(first.kind(), SessionKind::NewLearning);
    assert_eq!(first.resolved().start_minute(), 16 * 60);
    assert_eq!(first.cognitive_load(), 5);
    assert_eq!(schedule.sessions[2].kind(), SessionKind::PracticeTest);

    let unresolved: Vec<(&str, NaiveDate, &str)> = schedule
        .unresolved
        .iter()
        .map(|u| (u.session_id.as_str(), u.target_date, u.weekday.as_str()))
        .collect();
    assert_eq!(
        unresolved,
        vec![("maths-1", date(2), "tuesday"), ("maths-2", date(4), "thursday")]
    );
    assert!(schedule
        .unresolved
        .iter()
        .all(|u| u.reasons == vec![ConflictReason::NoAvailability]));

    assert_eq!(schedule.summary.schedule_span_days, 15);
    assert_eq!(schedule.summary.subject_balance["Mathematics"], 3);
    assert!(!schedule.sessions[2].has_break_after);
}

#[test]
fn test_two_hour_window_is_too_short_for_initial_learning() {
    let req = request(vec![maths()], monday_only("16:00", "18:00"), 4);
    let schedule = generate_schedule(&req, &PipelineOptions::default()).unwrap();

    let initial = schedule
        .unresolved
        .iter()
        .find(|u| u.session_id == "maths-0")
        .unwrap();
    assert!(matches!(
        initial.reasons.as_slice(),
        [ConflictReason::WindowTooShort { .. }]
    ));
    assert!(initial.message.contains("exceeds slot 16:00-18:00"));

    let placed: Vec<&str> = schedule.sessions.iter().map(|s| s.id()).collect();
    assert_eq!(placed, vec!["maths-3", "maths-4"]);
    assert_eq!(schedule.unresolved.len(), 3);
}

#[test]
fn test_same_day_sessions_are_placed_back_to_back() {
    let topics = vec![
        Topic::new("baroque", "Music", "Baroque"),
        Topic::new("romantic", "Music", "Romantic era"),
    ];
    let req = request(topics, monday_only("16:00", "20:00"), 4);
    let schedule = generate_schedule(&req, &PipelineOptions::default()).unwrap();

    let monday: Vec<_> = schedule
        .sessions
        .iter()
        .filter(|s| s.date() == date(1))
        .collect();
    assert_eq!(monday.len(), 2);
    assert_eq!(monday[0].resolved().start_minute(), 16 * 60);
    assert_eq!(monday[1].start_time(), monday[0].end_time());
    assert!(monday.iter().all(|s| s.resolved().conflicts.is_empty()));
}

#[test]
fn test_daily_cap_keeps_the_harder_subject_despite_overrides() {
    let topics = vec![
        Topic::new("music", "Music", "Baroque").with_difficulty(5),
        Topic::new("maths", "Mathematics", "Statistics").with_difficulty(1),
    ];
    let req = request(topics, monday_only("16:00", "23:00"), 1);
    let schedule = generate_schedule(&req, &PipelineOptions::default()).unwrap();

    let kept: Vec<&str> = schedule
        .sessions
        .iter()
        .filter(|s| s.date() == date(1))
        .map(|s| s.id())
        .collect();
    assert_eq!(kept, vec!["maths-0"]);
    assert_eq!(schedule.sessions[0].cognitive_load(), 1);

    let dropped = schedule
        .unresolved
        .iter()
        .find(|u| u.session_id == "music-0")
        .unwrap();
    assert_eq!(
        dropped.reasons,
        vec![ConflictReason::DailyCapExceeded { max_sessions_per_day: 1 }]
    );
}

#[test]
fn test_daily_cap_overflow_is_reported() {
    let topics = vec![
        Topic::new("a", "Music", "Baroque"),
        Topic::new("b", "Music", "Jazz"),
        Topic::new("c", "Music", "Film scores"),
    ];
    let req = request(topics, monday_only("16:00", "23:00"), 2);
    let schedule = generate_schedule(&req, &PipelineOptions::default()).unwrap();

    let on_monday = schedule.sessions.iter().filter(|s| s.date() == date(1)).count();
    assert_eq!(on_monday, 2);

    let capped: Vec<_> = schedule
        .unresolved
        .iter()
        .filter(|u| {
            u.reasons == vec![ConflictReason::DailyCapExceeded { max_sessions_per_day: 2 }]
        })
        .collect();
    assert_eq!(capped.len(), 1);
    assert_eq!(capped[0].target_date, date(1));
    assert_eq!(
        schedule.sessions.len() + schedule.unresolved.len(),
        schedule.summary.requested_sessions
    );
}

#[test]
fn test_output_is_serialized_with_wire_names() {
    let req = request(vec![maths()], monday_only("16:00", "20:00"), 4);
    let schedule = generate_schedule(&req, &PipelineOptions::default()).unwrap();
    let json = serde_json::to_value(&schedule).unwrap();

    let first = &json["sessions"][0];
    assert_eq!(first["sessionType"], "new-learning");
    assert_eq!(first["startTime"], "2024-01-01T16:00:00+00:00");
    assert_eq!(first["window"]["start"], "16:00");
    assert!(first["cognitiveLoad"].is_number());
    assert_eq!(json["unresolved"][0]["reasons"][0]["type"], "noAvailability");
    assert!(json["summary"]["cognitiveVariety"].is_number());
}
