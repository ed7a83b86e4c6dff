use chrono::{DateTime, Local};
use serde::Serialize;

use crate::{application::dto::transfer_dto::FileListingDTO, domain::naming::FileCategory};

#[derive(Debug, Serialize)]
pub struct FileResponse {
    #[serde(rename = "storageName")]
    pub storage_name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub category: FileCategory,
    pub extension: Option<String>,
    #[serde(rename = "sizeBytes")]
    pub size_bytes: u64,
    #[serde(rename = "uploadedAt")]
    pub uploaded_at: DateTime<Local>,
}

impl From<FileListingDTO> for FileResponse {
    fn from(file: FileListingDTO) -> Self {
        Self {
            storage_name: file.storage_name,
            display_name: file.display_name,
            category: file.category,
            extension: file.extension,
            size_bytes: file.size_bytes,
            uploaded_at: file.uploaded_at,
        }
    }
}
