use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::application::error::ApplicationError;

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApplicationError::NoFilePart => {
                warn!("Upload without a file part");
                (StatusCode::BAD_REQUEST, "No file part".to_string())
            }
            ApplicationError::NoFileSelected => {
                warn!("Upload with no file selected");
                (StatusCode::BAD_REQUEST, "No selected file".to_string())
            }
            ApplicationError::EmptyName => {
                warn!("Upload with an unusable file name");
                (StatusCode::BAD_REQUEST, "Invalid file name".to_string())
            }
            ApplicationError::UnsupportedType(ref name) => {
                warn!("File type not allowed: {}", name);
                (StatusCode::BAD_REQUEST, "File type not allowed".to_string())
            }
            ApplicationError::InvalidName(ref name) => {
                warn!("Invalid file name: {:?}", name);
                (StatusCode::BAD_REQUEST, "Invalid file name".to_string())
            }
            ApplicationError::NotFound => {
                warn!("Resource not found");
                (StatusCode::NOT_FOUND, "File not found".to_string())
            }
            ApplicationError::UploadInterrupted(ref msg) => {
                warn!("Upload interrupted: {}", msg);
                (StatusCode::BAD_REQUEST, "Upload interrupted".to_string())
            }
            ApplicationError::BadRequest(ref msg) => {
                warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "Bad request".to_string())
            }
            ApplicationError::IoError(ref msg) => {
                error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApplicationError::InternalError(ref msg) => {
                error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
