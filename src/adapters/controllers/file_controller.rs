use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, Redirect, Response},
    Json,
};
use futures::TryStreamExt;
use tokio_util::io::ReaderStream;
use tracing::warn;

use crate::{
    adapters::{dto::file_dto::FileResponse, state::AppState, views::index::render_index},
    application::error::ApplicationError,
    domain::models::file::ByteStream,
};

pub struct FileController;

impl FileController {
    /// GET /
    pub async fn index(State(app_state): State<AppState>) -> Result<Html<String>, ApplicationError> {
        let files = app_state.transfer_service.list_for_display().await?;
        Ok(Html(render_index(&files)))
    }

    /// GET /api/v1/files
    pub async fn list_files(
        State(app_state): State<AppState>,
    ) -> Result<Json<Vec<FileResponse>>, ApplicationError> {
        let files = app_state.transfer_service.list_for_display().await?;
        Ok(Json(files.into_iter().map(FileResponse::from).collect()))
    }

    /// POST /upload
    /// Multipart form with a `file` field; other fields are ignored.
    pub async fn upload_file(
        State(app_state): State<AppState>,
        mut multipart: Multipart,
    ) -> Result<Redirect, ApplicationError> {
        while let Some(field) = multipart.next_field().await.map_err(|e| {
            warn!("Invalid multipart data: {}", e);
            ApplicationError::BadRequest("Invalid request format".to_string())
        })? {
            if field.name() != Some("file") {
                continue;
            }

            let file_name = field.file_name().unwrap_or_default().to_string();
            if file_name.is_empty() {
                return Err(ApplicationError::NoFileSelected);
            }

            let content: ByteStream<'_> = Box::pin(field.map_err(std::io::Error::other));
            app_state
                .transfer_service
                .upload(&file_name, content)
                .await?;

            return Ok(Redirect::to("/"));
        }

        Err(ApplicationError::NoFilePart)
    }

    /// GET /download/{storage_name}
    pub async fn download_file(
        State(app_state): State<AppState>,
        Path(storage_name): Path<String>,
    ) -> Result<Response, ApplicationError> {
        let download = app_state.transfer_service.download(&storage_name).await?;

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, download.mime_type)
            .header(header::CONTENT_LENGTH, download.content.size_bytes)
            .header(
                header::CONTENT_DISPOSITION,
                content_disposition(&download.file_name),
            )
            .body(Body::from_stream(ReaderStream::new(download.content.file)))
            .map_err(|e| ApplicationError::InternalError(e.to_string()))
    }

    /// GET /delete/{storage_name}
    pub async fn delete_file(
        State(app_state): State<AppState>,
        Path(storage_name): Path<String>,
    ) -> Result<Redirect, ApplicationError> {
        app_state.transfer_service.remove(&storage_name).await?;
        Ok(Redirect::to("/"))
    }
}

/// `attachment` disposition whose quoted filename is always a valid header value.
fn content_disposition(file_name: &str) -> String {
    let quoted: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    format!("attachment; filename=\"{}\"", quoted)
}
