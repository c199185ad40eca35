mod health;
mod timetable;

use axum::response::{IntoResponse, Response};
use axum::Router;
use serde::de::DeserializeOwned;

use crate::response::AppError;
use crate::state::AppState;

const HEALTH_PATHS: [&str; 2] = ["/health", "/api/health"];

pub fn router(state: AppState) -> Router {
    let enable_adjust = state.config().enable_adjust;

    let mut app = Router::new().nest("/api/timetable", timetable::router(enable_adjust));
    for path in HEALTH_PATHS {
        app = app.nest(path, health::router());
    }

    app.fallback(fallback_handler).with_state(state)
}

/// Decodes a JSON body; syntax and shape errors become `400 BAD_REQUEST`.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|err| {
        tracing::debug!(error = %err, "rejected request body");
        AppError::invalid_body(&err)
    })
}

async fn fallback_handler() -> Response {
    AppError::not_found("route not found").into_response()
}
