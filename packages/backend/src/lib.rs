pub mod config;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::state::AppState;

pub fn create_app_with_config(config: Config) -> axum::Router {
    routes::router(AppState::new(config))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
