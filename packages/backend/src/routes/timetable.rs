use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use studyplan_algo::{AdjustmentOutcome, ScheduleRequest, StudyPlan};

use crate::response::{AppError, SuccessResponse};
use crate::routes::parse_json;
use crate::services::timetable::{self, AdjustInput, AnalyzeInput, GeneratedTimetable};
use crate::state::AppState;

pub fn router(enable_adjust: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/generate", post(generate))
        .route("/analyze", post(analyze));

    if enable_adjust {
        router.route("/adjust", post(adjust))
    } else {
        router
    }
}

async fn generate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SuccessResponse<GeneratedTimetable>>, AppError> {
    let request: ScheduleRequest = parse_json(&body)?;
    let generated = timetable::generate(request, &state.pipeline_options(), timetable::today())?;
    Ok(Json(SuccessResponse::new(generated)))
}

async fn analyze(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SuccessResponse<StudyPlan>>, AppError> {
    let input: AnalyzeInput = parse_json(&body)?;
    let plan = timetable::analyze(&input, &state.pipeline_options())?;
    Ok(Json(SuccessResponse::new(plan)))
}

async fn adjust(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SuccessResponse<AdjustmentOutcome>>, AppError> {
    let input: AdjustInput = parse_json(&body)?;
    let outcome = timetable::adjust(input, &state.pipeline_options())?;
    Ok(Json(SuccessResponse::new(outcome)))
}
