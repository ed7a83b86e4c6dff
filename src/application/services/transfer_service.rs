use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::{
    application::{
        dto::transfer_dto::{DownloadDTO, FileListingDTO, StoreStatsDTO},
        error::ApplicationError,
        services::StorageService,
    },
    domain::{models::file::ByteStream, naming},
};

/// Request-facing operations; every bit of state lives in the store.
#[derive(Clone)]
pub struct TransferService {
    storage: Arc<dyn StorageService>,
}

impl TransferService {
    pub fn new(storage: Arc<dyn StorageService>) -> Self {
        Self { storage }
    }

    pub async fn upload(
        &self,
        original_name: &str,
        content: ByteStream<'_>,
    ) -> Result<String, ApplicationError> {
        self.upload_at(original_name, content, Local::now()).await
    }

    /// Validates and names the upload before touching the disk, then streams
    /// it into the store. Returns the storage name.
    pub async fn upload_at(
        &self,
        original_name: &str,
        content: ByteStream<'_>,
        now: DateTime<Local>,
    ) -> Result<String, ApplicationError> {
        if original_name.trim().is_empty() {
            return Err(ApplicationError::EmptyName);
        }

        let storage_name = naming::encode(original_name, &now).inspect_err(|e| {
            warn!(name = original_name, error = ?e, "Upload rejected");
        })?;

        let bytes = self.storage.save_stream(&storage_name, content).await?;
        info!(file = %storage_name, bytes, "File uploaded");

        Ok(storage_name)
    }

    pub async fn list_for_display(&self) -> Result<Vec<FileListingDTO>, ApplicationError> {
        let files = self.storage.list().await?;
        Ok(files.into_iter().map(FileListingDTO::from).collect())
    }

    pub async fn download(&self, storage_name: &str) -> Result<DownloadDTO, ApplicationError> {
        let content = self.storage.fetch(storage_name).await?;
        let mime_type = mime_guess::from_path(storage_name)
            .first_or_octet_stream()
            .to_string();

        info!(file = storage_name, bytes = content.size_bytes, "Serving download");

        Ok(DownloadDTO {
            file_name: content.storage_name.clone(),
            content,
            mime_type,
        })
    }

    /// Idempotent: removing a missing file succeeds.
    pub async fn remove(&self, storage_name: &str) -> Result<(), ApplicationError> {
        self.storage.delete(storage_name).await?;
        info!(file = storage_name, "File removed");
        Ok(())
    }

    pub async fn stats(&self) -> Result<StoreStatsDTO, ApplicationError> {
        let files = self.storage.list().await?;
        Ok(StoreStatsDTO {
            file_count: files.len(),
            total_bytes: files.iter().map(|f| f.size_bytes).sum(),
        })
    }
}
