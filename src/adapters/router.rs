use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::adapters::{
    controllers::{file_controller::FileController, health_controller::HealthController},
    state::AppState,
};

pub fn create_router(app_state: AppState) -> Router {
    let max_upload_bytes = app_state.config.max_upload_bytes;

    Router::new()
        .route("/", get(FileController::index))
        .route("/upload", post(FileController::upload_file))
        .route("/download/{storage_name}", get(FileController::download_file))
        .route("/delete/{storage_name}", get(FileController::delete_file))
        .route("/api/v1/files", get(FileController::list_files))
        .route("/api/v1/health", get(HealthController::health_check))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
