//! Timetable service
//!
//! Thin layer over `studyplan_algo`: fills request defaults that need the
//! clock, runs the pipeline, and stamps the result with an id and a content
//! fingerprint. The only clock read of the whole system happens in `today`.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use studyplan_algo::{
    apply_edits, generate_schedule, plan_study, AdjustmentOutcome, FinalSession,
    PipelineOptions, Preferences, Schedule, ScheduleError, ScheduleRequest, SessionEdit,
    StudyPlan, Topic, WeeklyAvailability,
};

use crate::response::AppError;

#[derive(Debug, Error)]
pub enum TimetableError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("failed to serialize schedule: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<TimetableError> for AppError {
    fn from(err: TimetableError) -> Self {
        match err {
            TimetableError::Schedule(err) => err.into(),
            TimetableError::Serialize(err) => AppError::internal(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTimetable {
    pub id: String,
    pub fingerprint: String,
    pub schedule: Schedule,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeInput {
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub preferences: Preferences,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustInput {
    pub sessions: Vec<FinalSession>,
    pub edits: Vec<SessionEdit>,
    pub availability: WeeklyAvailability,
    #[serde(default)]
    pub preferences: Preferences,
}

/// Current UTC calendar date
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Hex SHA-256 of the serialized schedule
pub fn fingerprint(schedule: &Schedule) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(schedule)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

pub fn generate(
    mut request: ScheduleRequest,
    options: &PipelineOptions,
    today: NaiveDate,
) -> Result<GeneratedTimetable, TimetableError> {
    let start_date = *request
        .preferences
        .schedule_start_date
        .get_or_insert(today);

    let schedule = generate_schedule(&request, options)?;
    let fingerprint = fingerprint(&schedule)?;
    let id = Uuid::new_v4().to_string();

    tracing::info!(
        %id,
        %start_date,
        topics = request.topics.len(),
        sessions = schedule.sessions.len(),
        unresolved = schedule.unresolved.len(),
        "timetable generated"
    );

    Ok(GeneratedTimetable {
        id,
        fingerprint,
        schedule,
    })
}

pub fn analyze(input: &AnalyzeInput, options: &PipelineOptions) -> Result<StudyPlan, TimetableError> {
    let plan = plan_study(&input.topics, &input.preferences, options)?;
    tracing::info!(
        topics = plan.analyses.len(),
        span_days = plan.plan.total_schedule_span,
        "topics analyzed"
    );
    Ok(plan)
}

pub fn adjust(input: AdjustInput, options: &PipelineOptions) -> Result<AdjustmentOutcome, TimetableError> {
    let edits = input.edits.len();
    let outcome = apply_edits(
        input.sessions,
        &input.edits,
        &input.availability,
        &input.preferences,
        options,
    )?;

    tracing::info!(
        edits,
        rejected = outcome.rejected.len(),
        sessions = outcome.sessions.len(),
        "timetable adjusted"
    );
    Ok(outcome)
}
